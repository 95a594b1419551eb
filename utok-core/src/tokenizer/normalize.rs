//! Character normalization applied once per line before segmentation
//!
//! Repairs common miscodings, folds non-standard spaces, and deletes
//! control characters and misplaced zero-width characters. Deletions go
//! through an [`OffsetMap`], so spans still point into the original line.

use crate::charclass::{class_of, is_punct, CharClass};
use crate::remap::OffsetMap;
use regex::Regex;
use std::sync::LazyLock;

const ZWSP: char = '\u{200B}';
const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';
const ETHIOPIC_WORDSPACE: char = '፡';

const NBSP_ENTITIES: [&str; 3] = ["&#160;", "&#xa0;", "&nbsp;"];

const MISCODINGS: [(&str, char); 7] = [
    ("¡¦", '’'),
    ("¡§", '“'),
    ("¡¨", '”'),
    ("Âº", 'º'),
    ("Ã±", 'ñ'),
    ("Ãº", 'ú'),
    ("Ä±", 'ı'),
];

/// Scripts inside whose words a zero-width space is dropped
const ZWSP_SCRIPTS: [&str; 18] = [
    "Arabic",
    "Armenian",
    "Bengali",
    "Cyrillic",
    "Devanagari",
    "Ethiopic",
    "Georgian",
    "Greek",
    "Gujarati",
    "Hangul",
    "Hebrew",
    "Kannada",
    "Latin",
    "Malayalam",
    "Oriya",
    "Sinhala",
    "Tamil",
    "Telugu",
];

static SCRIPT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ZWSP_SCRIPTS
        .iter()
        .map(|script| Regex::new(&format!(r"^\p{{{script}}}$")).unwrap())
        .collect()
});

fn script_index(c: char) -> Option<usize> {
    let mut buf = [0u8; 4];
    let s = c.encode_utf8(&mut buf);
    SCRIPT_RES.iter().position(|re| re.is_match(s))
}

/// C1 control characters that are really unconverted Windows-1252
fn windows1252(c: char) -> Option<char> {
    let mapped = match c {
        '\u{80}' => '€',
        '\u{82}' => '‚',
        '\u{83}' => 'ƒ',
        '\u{84}' => '„',
        '\u{85}' => '…',
        '\u{86}' => '†',
        '\u{87}' => '‡',
        '\u{88}' => 'ˆ',
        '\u{89}' => '‰',
        '\u{8A}' => 'Š',
        '\u{8B}' => '‹',
        '\u{8C}' => 'Œ',
        '\u{8E}' => 'Ž',
        '\u{91}' => '‘',
        '\u{92}' => '’',
        '\u{93}' => '“',
        '\u{94}' => '”',
        '\u{95}' => '•',
        '\u{96}' => '–',
        '\u{97}' => '—',
        '\u{98}' => '˜',
        '\u{99}' => '™',
        '\u{9A}' => 'š',
        '\u{9B}' => '›',
        '\u{9C}' => 'œ',
        '\u{9E}' => 'ž',
        '\u{9F}' => 'Ÿ',
        _ => return None,
    };
    Some(mapped)
}

fn is_space_or_punct(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_whitespace() || is_punct(c))
}

/// A line under normalization with its offset map
#[derive(Debug)]
struct LineEditor {
    chars: Vec<char>,
    map: OffsetMap,
}

impl LineEditor {
    fn new(line: &str) -> Self {
        let chars: Vec<char> = line.chars().collect();
        let map = OffsetMap::new(chars.len());
        Self { chars, map }
    }

    fn at(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    fn before(&self, i: usize) -> Option<char> {
        i.checked_sub(1).and_then(|j| self.at(j))
    }

    /// Replace every occurrence of `pattern` by the single character `with`
    fn replace_all(&mut self, pattern: &str, with: char, ignore_case: bool) {
        let pattern: Vec<char> = pattern.chars().collect();
        let n = pattern.len();
        let mut doomed = vec![false; self.chars.len()];
        let mut hits = false;
        let mut i = 0;
        while n > 0 && i + n <= self.chars.len() {
            let hit = self.chars[i..i + n].iter().zip(&pattern).all(|(a, b)| {
                if ignore_case {
                    a.to_ascii_lowercase() == *b
                } else {
                    a == b
                }
            });
            if hit {
                self.chars[i] = with;
                doomed[i + 1..i + n].iter_mut().for_each(|d| *d = true);
                hits = true;
                i += n;
            } else {
                i += 1;
            }
        }
        if hits {
            self.compact(&doomed);
        }
    }

    /// Replace single characters in place
    fn map_chars(&mut self, f: impl Fn(&LineEditor, usize) -> Option<char>) {
        let replacements: Vec<(usize, char)> = (0..self.chars.len())
            .filter_map(|i| f(self, i).map(|c| (i, c)))
            .collect();
        for (i, c) in replacements {
            self.chars[i] = c;
        }
    }

    /// Delete all characters selected by `select`, judged on the text before any deletion
    fn delete_where(&mut self, select: impl Fn(&LineEditor, usize) -> bool) {
        let doomed: Vec<bool> = (0..self.chars.len()).map(|i| select(self, i)).collect();
        if doomed.contains(&true) {
            self.compact(&doomed);
        }
    }

    /// Drop the flagged characters from the text and the offset map in one pass
    fn compact(&mut self, doomed: &[bool]) {
        let mut i = 0;
        self.chars.retain(|_| {
            i += 1;
            !doomed[i - 1]
        });
        self.map.delete_many(doomed);
    }

    /// Drop duplicates, line-edge occurrences and occurrences next to spaces or punctuation
    fn trim_zero_width(&mut self, zw: char) {
        self.delete_where(|e, i| e.chars[i] == zw && e.before(i) == Some(zw));
        self.delete_where(|e, i| e.chars[i] == zw && (i == 0 || i + 1 == e.chars.len()));
        self.delete_where(|e, i| e.chars[i] == zw && is_space_or_punct(e.at(i + 1)));
        self.delete_where(|e, i| e.chars[i] == zw && is_space_or_punct(e.before(i)));
    }

    fn finish(self) -> (String, OffsetMap) {
        (self.chars.into_iter().collect(), self.map)
    }
}

/// Normalize `line`, whose character classes are summarized in `lv`
pub(crate) fn normalize(line: &str, lv: CharClass) -> (String, OffsetMap) {
    let mut lv = lv;
    let mut editor = LineEditor::new(line);

    if lv.intersects(CharClass::AMPERSAND) {
        for entity in NBSP_ENTITIES {
            editor.replace_all(entity, '\u{A0}', true);
        }
        lv |= CharClass::NON_STANDARD_SPACE;
    }
    if lv.intersects(CharClass::MICRO_SIGN) {
        editor.map_chars(|e, i| (e.chars[i] == 'µ').then_some('μ'));
    }
    if lv.intersects(CharClass::NON_STANDARD_PUNCT) {
        editor.map_chars(|e, i| (e.chars[i] == '․').then_some('.'));
    }
    if lv.intersects(CharClass::MISCODE_ELEM | CharClass::MASCULINE_ORDINAL) {
        for (miscoded, repaired) in MISCODINGS {
            editor.replace_all(miscoded, repaired, false);
        }
    }

    if lv.intersects(CharClass::DELETABLE_CONTROL | CharClass::NON_STANDARD_SPACE) {
        editor.map_chars(|e, i| windows1252(e.chars[i]));
        // '፡፡' and '፡-' stay for later repair
        editor.map_chars(|e, i| {
            (e.chars[i] == ETHIOPIC_WORDSPACE
                && e.before(i) != Some(ETHIOPIC_WORDSPACE)
                && !matches!(e.at(i + 1), Some(ETHIOPIC_WORDSPACE | '-')))
            .then_some(' ')
        });
        editor.delete_where(|e, i| class_of(e.chars[i]).intersects(CharClass::DELETABLE_CONTROL));
        editor.map_chars(|e, i| {
            let c = e.chars[i];
            (c != ETHIOPIC_WORDSPACE && class_of(c).intersects(CharClass::NON_STANDARD_SPACE))
                .then_some(' ')
        });
    }

    if lv.intersects(CharClass::ZWSP) {
        editor.trim_zero_width(ZWSP);
        editor.delete_where(|e, i| {
            e.chars[i] == ZWSP
                && match (e.before(i), e.at(i + 1)) {
                    (Some(prev), Some(next)) => {
                        script_index(prev).is_some_and(|script| script_index(next) == Some(script))
                    }
                    _ => false,
                }
        });
    }
    if lv.intersects(CharClass::ZWNJ) {
        remove_mixed_joiner_runs(&mut editor);
        editor.trim_zero_width(ZWNJ);
    }
    if lv.intersects(CharClass::ZWJ) {
        editor.trim_zero_width(ZWJ);
    }
    if lv.intersects(CharClass::VARIATION_SELECTOR) {
        editor.delete_where(|e, i| {
            if !class_of(e.chars[i]).intersects(CharClass::VARIATION_SELECTOR) {
                return false;
            }
            e.chars[..i]
                .iter()
                .rev()
                .find(|c| !class_of(**c).intersects(CharClass::VARIATION_SELECTOR))
                .is_some_and(|&base| base <= '\u{218F}')
        });
    }

    editor.finish()
}

/// Delete runs of joiners and non-joiners in which the two are adjacent
fn remove_mixed_joiner_runs(editor: &mut LineEditor) {
    let is_joiner = |c: char| c == ZWNJ || c == ZWJ;
    let n = editor.chars.len();
    let mut doomed = vec![false; n];
    let mut i = 0;
    while i < n {
        if !is_joiner(editor.chars[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && is_joiner(editor.chars[i]) {
            i += 1;
        }
        let run = &editor.chars[start..i];
        if run.windows(2).any(|pair| pair[0] != pair[1]) {
            doomed[start..i].iter_mut().for_each(|d| *d = true);
        }
    }
    editor.delete_where(|_, i| doomed[i]);
}
