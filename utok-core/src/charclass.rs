//! Character classes as bit sets
//!
//! Every code point maps to a [`CharClass`], a set of property bits. The
//! union over a line (its "line vector") lets pipeline stages skip work
//! when the line contains nothing they could act on.
//!
//! Basic Multilingual Plane classes come from a table built once on first
//! use; astral code points are classified on demand.

use regex::Regex;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::{LazyLock, OnceLock};

/// Set of character property bits
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharClass(u64);

impl CharClass {
    pub const NONE: Self = Self(0);
    pub const DELETABLE_CONTROL: Self = Self(1 << 0);
    pub const VARIATION_SELECTOR: Self = Self(1 << 1);
    pub const NON_STANDARD_SPACE: Self = Self(1 << 2);
    pub const NON_STANDARD_PUNCT: Self = Self(1 << 3);
    pub const ZWSP: Self = Self(1 << 4);
    pub const ZWNJ: Self = Self(1 << 5);
    pub const ZWJ: Self = Self(1 << 6);
    pub const AMPERSAND: Self = Self(1 << 7);
    pub const NUMBER_SIGN: Self = Self(1 << 8);
    pub const AT_SIGN: Self = Self(1 << 9);
    pub const LESS_THAN: Self = Self(1 << 10);
    pub const MICRO_SIGN: Self = Self(1 << 11);
    pub const MASCULINE_ORDINAL: Self = Self(1 << 12);
    pub const LEFT_SQUARE_BRACKET: Self = Self(1 << 13);
    pub const SLASH: Self = Self(1 << 14);
    pub const APOSTROPHE: Self = Self(1 << 15);
    pub const QUOTE: Self = Self(1 << 16);
    pub const DASH: Self = Self(1 << 17);
    pub const ALPHA: Self = Self(1 << 18);
    pub const DIGIT: Self = Self(1 << 19);
    pub const MODIFIER: Self = Self(1 << 20);
    pub const MISC_SYMBOL: Self = Self(1 << 21);
    pub const MISCODE_ELEM: Self = Self(1 << 22);
    pub const GREEK: Self = Self(1 << 23);
    pub const HEBREW: Self = Self(1 << 24);
    pub const DEVANAGARI: Self = Self(1 << 25);
    pub const BENGALI: Self = Self(1 << 26);
    pub const GURMUKHI: Self = Self(1 << 27);
    pub const GUJARATI: Self = Self(1 << 28);
    pub const ORIYA: Self = Self(1 << 29);
    pub const TAMIL: Self = Self(1 << 30);
    pub const TELUGU: Self = Self(1 << 31);
    pub const KANNADA: Self = Self(1 << 32);
    pub const MALAYALAM: Self = Self(1 << 33);
    pub const ETHIOPIC_NUMBER: Self = Self(1 << 34);
    pub const HANGUL: Self = Self(1 << 35);
    pub const LOWER_UPPER_UNSTABLE: Self = Self(1 << 36);
    /// Set only for the configured attach tag, see [`Classifier`]
    pub const ATTACH_TAG: Self = Self(1 << 37);
    pub const PUNCT: Self = Self(1 << 38);

    pub const DASH_OR_DIGIT: Self = Self(Self::DASH.0 | Self::DIGIT.0);
    pub const INDIC: Self = Self(
        Self::DEVANAGARI.0
            | Self::BENGALI.0
            | Self::GURMUKHI.0
            | Self::GUJARATI.0
            | Self::ORIYA.0
            | Self::TAMIL.0
            | Self::TELUGU.0
            | Self::KANNADA.0
            | Self::MALAYALAM.0,
    );

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True if any bit of `other` is set
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if all bits of `other` are set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CharClass {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for CharClass {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CharClass {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharClass({:#x})", self.0)
    }
}

const BMP_LEN: usize = 0x10000;

static BMP_TABLE: OnceLock<Vec<CharClass>> = OnceLock::new();

static RE_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{L}$").unwrap());
static RE_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{Nd}$").unwrap());
static RE_MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{M}$").unwrap());
static RE_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{P}$").unwrap());

/// Class of a character, without the attach-tag bit
pub fn class_of(c: char) -> CharClass {
    let cp = c as usize;
    if cp < BMP_LEN {
        BMP_TABLE.get_or_init(build_bmp_table)[cp]
    } else {
        compute_class(c)
    }
}

/// Letter (general category L)
pub fn is_letter(c: char) -> bool {
    class_of(c).intersects(CharClass::ALPHA)
}

/// Combining mark (general category M)
pub fn is_mark(c: char) -> bool {
    class_of(c).intersects(CharClass::MODIFIER)
}

/// Decimal digit (general category Nd)
pub fn is_digit(c: char) -> bool {
    class_of(c).intersects(CharClass::DIGIT)
}

/// Punctuation (general category P)
pub fn is_punct(c: char) -> bool {
    class_of(c).intersects(CharClass::PUNCT)
}

fn build_bmp_table() -> Vec<CharClass> {
    (0..BMP_LEN as u32)
        .map(|cp| char::from_u32(cp).map_or(CharClass::NONE, compute_class))
        .collect()
}

fn compute_class(c: char) -> CharClass {
    let cp = c as u32;
    let mut class = CharClass::NONE;

    if matches!(cp, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F | 0x7F | 0x80..=0x9F)
        || matches!(cp, 0xAD | 0x640 | 0x200E..=0x200F | 0xFEFF)
    {
        class |= CharClass::DELETABLE_CONTROL;
    }
    if matches!(cp, 0xFE00..=0xFE0F | 0xE0100..=0xE01EF) {
        class |= CharClass::VARIATION_SELECTOR;
    }
    if matches!(cp, 0x2000..=0x200A | 0xA0 | 0x1361 | 0x202F | 0x205F | 0x3000) {
        class |= CharClass::NON_STANDARD_SPACE;
    }
    if cp == 0x2024 {
        class |= CharClass::NON_STANDARD_PUNCT;
    }
    if matches!(cp, 0x2190..=0x2BFF | 0x1F300..=0x1F64F) {
        class |= CharClass::MISC_SYMBOL;
    }
    class |= match c {
        '&' => CharClass::AMPERSAND,
        '#' => CharClass::NUMBER_SIGN,
        '@' => CharClass::AT_SIGN,
        '<' => CharClass::LESS_THAN,
        'µ' => CharClass::MICRO_SIGN,
        'º' => CharClass::MASCULINE_ORDINAL,
        '[' => CharClass::LEFT_SQUARE_BRACKET,
        '/' => CharClass::SLASH,
        '\u{200B}' => CharClass::ZWSP,
        '\u{200C}' => CharClass::ZWNJ,
        '\u{200D}' => CharClass::ZWJ,
        'İ' => CharClass::LOWER_UPPER_UNSTABLE,
        _ => CharClass::NONE,
    };
    if "¦§¨±Ã".contains(c) {
        class |= CharClass::MISCODE_ELEM;
    }
    if "'’".contains(c) {
        class |= CharClass::APOSTROPHE;
    }
    if "'‘’`‛\"“”‟".contains(c) {
        class |= CharClass::QUOTE;
    }
    if "-−–".contains(c) {
        class |= CharClass::DASH;
    }
    class |= match cp {
        0x0370..=0x03E1 => CharClass::GREEK,
        0x0591..=0x05FF => CharClass::HEBREW,
        0x0900..=0x097F => CharClass::DEVANAGARI,
        0x0980..=0x09FF => CharClass::BENGALI,
        0x0A00..=0x0A7F => CharClass::GURMUKHI,
        0x0A80..=0x0AFF => CharClass::GUJARATI,
        0x0B00..=0x0B7F => CharClass::ORIYA,
        0x0B80..=0x0BFF => CharClass::TAMIL,
        0x0C00..=0x0C7F => CharClass::TELUGU,
        0x0C80..=0x0CFF => CharClass::KANNADA,
        0x0D00..=0x0D7F => CharClass::MALAYALAM,
        0x1369..=0x137F => CharClass::ETHIOPIC_NUMBER,
        0xAC00..=0xD7AF => CharClass::HANGUL,
        _ => CharClass::NONE,
    };

    let mut buf = [0u8; 4];
    let s = c.encode_utf8(&mut buf);
    if RE_LETTER.is_match(s) {
        class |= CharClass::ALPHA;
    } else if RE_DIGIT.is_match(s) {
        class |= CharClass::DIGIT;
    } else if RE_MARK.is_match(s) {
        class |= CharClass::MODIFIER;
    } else if RE_PUNCT.is_match(s) {
        class |= CharClass::PUNCT;
    }
    class
}

/// Classifier aware of the configured attach tag
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    attach_tag: char,
}

impl Classifier {
    pub fn new(attach_tag: char) -> Self {
        Self { attach_tag }
    }

    pub fn attach_tag(&self) -> char {
        self.attach_tag
    }

    pub fn classify(&self, c: char) -> CharClass {
        let class = class_of(c);
        if c == self.attach_tag {
            class | CharClass::ATTACH_TAG
        } else {
            class
        }
    }

    /// Union of the classes of all characters in `s`
    pub fn line_vector(&self, s: &str) -> CharClass {
        s.chars()
            .fold(CharClass::NONE, |acc, c| acc | self.classify(c))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new('@')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_classes() {
        assert!(class_of('a').contains(CharClass::ALPHA));
        assert!(class_of('7').contains(CharClass::DIGIT));
        assert!(class_of('\u{0301}').contains(CharClass::MODIFIER));
        assert!(class_of('\u{00AD}').contains(CharClass::DELETABLE_CONTROL));
        assert!(class_of('\u{3000}').contains(CharClass::NON_STANDARD_SPACE));
        assert!(class_of('’').contains(CharClass::APOSTROPHE | CharClass::QUOTE));
        assert!(class_of('–').contains(CharClass::DASH));
        assert!(class_of('İ').contains(CharClass::LOWER_UPPER_UNSTABLE | CharClass::ALPHA));
    }

    #[test]
    fn test_punct_class() {
        for c in ['.', ',', '!', '«', '¿', '、', '–', '\u{10100}'] {
            assert!(is_punct(c), "{c:?}");
        }
        for c in ['a', '7', ' ', '$', '+', '\u{200B}'] {
            assert!(!is_punct(c), "{c:?}");
        }
        let lv = Classifier::default().line_vector("Hi there!");
        assert!(lv.contains(CharClass::PUNCT | CharClass::ALPHA));
        assert!(!Classifier::default().line_vector("Hi there").intersects(CharClass::PUNCT));
    }

    #[test]
    fn test_script_classes() {
        assert!(class_of('α').contains(CharClass::GREEK | CharClass::ALPHA));
        assert!(class_of('क').intersects(CharClass::INDIC));
        assert!(class_of('한').contains(CharClass::HANGUL));
        assert!(class_of('፩').contains(CharClass::ETHIOPIC_NUMBER));
    }

    #[test]
    fn test_astral_classes() {
        assert!(class_of('😀').contains(CharClass::MISC_SYMBOL));
        assert!(class_of('\u{E0100}').contains(CharClass::VARIATION_SELECTOR));
        assert!(class_of('𝐀').contains(CharClass::ALPHA));
    }

    #[test]
    fn test_line_vector_with_attach_tag() {
        let classifier = Classifier::new('@');
        let lv = classifier.line_vector("a @-@ 5");
        assert!(lv.contains(CharClass::ATTACH_TAG));
        assert!(lv.contains(CharClass::AT_SIGN));
        assert!(lv.contains(CharClass::DASH_OR_DIGIT));
        assert!(!lv.intersects(CharClass::GREEK));

        let plain = Classifier::new('¤');
        assert!(!plain.line_vector("a @-@ 5").intersects(CharClass::ATTACH_TAG));
    }
}
