//! Regular expressions of the pattern-driven stages
//!
//! A pattern describes a token and what may not follow it (as a lookahead).
//! What may not precede a token is checked by a guard function on the text
//! before the match, see [`find_guarded`].

use super::context::{ends_with_digit, ends_with_letter, is_dash, is_latin_letter, last_char, penultimate_char};
use crate::charclass::is_letter;
use crate::resource::{RuleStore, TopLevelDomains};
use fancy_regex::Regex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

macro_rules! pattern {
    ($(#[$doc:meta])* $name:ident, $re:expr) => {
        $(#[$doc])*
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).unwrap());
    };
}

pattern!(XML, r#"(?is)</?[a-z][-_:a-z0-9]*(?:\s+[a-z][-_:a-z0-9]*=(?:"[^"]*"|'[^']*'))*\s*/?>|<\$[-_a-z0-9]+\$>|<!--.*?-->"#);
pattern!(BBCODE, r"(?i)\[(?:QUOTE|URL|COLOR|SIZE)=[^\t\n\[\]]+\]|\[/?(?:QUOTE|IMG|INDENT|URL|B|I|COLOR|CENTER|SIZE)\]");

pattern!(
    /// URLs and filenames contain a period followed by two letters
    DOT_AB,
    r"(?i)\.[a-z][a-z]"
);
pattern!(
    URL_SCHEME,
    r"(?i)(?:https?|ftps?)://(?:\pL\pM*|\d|[-_,./:;=?@'`~#%&*+]|\((?:\pL\pM*|\d|[-_,./:;=?@'`~#%&*+])\))+(?:\pL\pM*|\d|/)"
);

const FILE_SUFFIXES: &str = "app|aspx?|bmp|cgi|csv|dat|docx?|eps|exe|gif|html?|jpeg|jpg|mov|mp3|mp4|\
                             pdf|php|png|pptx?|ps|rtf|tiff|tsv|tok|txt|xlsx?|xml|zip";

pub(crate) static FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\pL\pM*|\d|/)(?:(?:\pL\pM*|\d|[-_./])*(?:\pL\pM*|\d))?\.(?:{FILE_SUFFIXES})(?!\pL|\d)"
    ))
    .unwrap()
});
pattern!(
    ABS_FILENAME,
    r"(?i)/(?:bin|etc|home\d*|opt|root/sbin|tmp|usr|var|wp-content)/(?:(?:\pL\pM*|\d|[-_./])*(?:\pL\pM*|\d))?(?!\pL|\d)"
);
pattern!(
    EMAIL,
    r"(?i)\pL\pM*(?:\pL\pM*|\d|[-_.])*(?:\pL\pM*|\d)@(?:\pL\pM*|\d)(?:\pL\pM*|\d|[-_.])*(?:\pL\pM*|\d)\.[a-z]{2,}(?!\pL|\pM|\d|\.)"
);
pattern!(HASHTAG_OR_HANDLE, "[#@](?:\\pL\\pM*|\\d|[_\u{200C}])+(?!\\.?(?:\\pL|\\d))");

pattern!(ABBREV_PRODUCT, r"\p{Lu}+[-−–](?:\d|\p{Lu}\pM*){1,3}s?(?!\pL|\d|[-−–])");
pattern!(CAP_INITIAL, r"\p{Lu}\.");
pattern!(
    INITIAL_RIGHT_CONTEXT,
    r"^\s?(?:\s?\p{Lu}\.)*\s?(?:\p{Lu}\p{Ll}{2}|(?:Mc|O'|O’)\p{Lu})"
);
pattern!(LETTER, r"\pL");
pattern!(ABBREV_PERIODS, r"(?:(?:\pL\pM*){1,2}\.){2,}(?!\pL|\d|\.)");

pattern!(GREEK_CONTRACTION, r"(?:(?=\p{Greek})\pL)+['’]");
pattern!(ENGLISH_CLITIC, r"(?i)['’](?:d|em|ll|m|re|s|ve)\b");

pattern!(ETHIOPIC_NUMBER, "[\u{1369}-\u{137C}]+");
pattern!(
    NUMBER,
    r"[-−–+]?(?:\d{1,3}(?:[,،]\d\d\d)+(?:\.\d+)?|\d{1,2}(?:,\d\d)*,\d\d\d(?:\.\d+)?|\d+\.\d+)(?![.,]?\d)"
);
pattern!(
    NUMBER_DECIMAL_COMMA,
    r"[-−–+]?(?:\d{1,3}(?:\.\d\d\d)+(?:,\d+)?|\d{1,2}(?:\.\d\d)*\.\d\d\d(?:,\d+)?|\d+,\d+)(?![.,]?\d)"
);
pattern!(INTEGER, r"[-−–+]?\d+(?![-−–.,]?\d)");
pattern!(
    /// Digits glued to a following word or slash, e.g. `5weeks`
    LEADING_INTEGER,
    r"\d+(?=\pL|/)"
);

pattern!(DASH_LETTERS_DASH, r"[-−–](?:\pL\pM*)+[-−–]");
pattern!(
    MULTI_DASH_NAME,
    r"\p{Lu}\pM*(?:\p{Ll}\pM*)+(?:[-−–]\p{Lu}\pM*(?:\p{Ll}\pM*)+)*(?:[-−–](?:de|du|e|en|et|i|la|le|upon|sur)[-−–]\p{Lu}\pM*(?:\p{Ll}\pM*)+(?:[-−–]\p{Lu}\pM*(?:\p{Ll}\pM*)+)*)+(?!\pL|\pM|\d|[-−–—+.]|['‘’`‛]\pL)"
);

pattern!(
    /// A dash after two letters, a digit or `!?’` and before two letters or a digit
    INFIX_DASH,
    r"(?:\pL\pM*\pL\pM*|\d|[!?’])([-−–]+)(?:\pL\pM*\pL\pM*|\d)"
);

pub(crate) static SYMBOL_CHAR: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[\p{S}--[\-=*+<>^|`]]").unwrap());
pub(crate) static PUNCT_CHAR: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[\p{P}\-=*+<>^|`]").unwrap());

/// Languages whose numbers never use a decimal comma
pub(crate) const NO_DECIMAL_COMMA: [&str; 7] = ["asm", "ben", "hin", "kan", "mal", "tam", "tel"];

const APOSTROPHES: &str = "'‘’`‛";

pub(crate) fn is_match(re: &Regex, s: &str) -> bool {
    re.is_match(s).unwrap_or(false)
}

/// Leftmost match of `re` in `s` whose preceding text passes `guard`
pub(crate) fn find_guarded(re: &Regex, s: &str, guard: impl Fn(&str) -> bool) -> Option<Range<usize>> {
    find_group_guarded(re, 0, s, guard)
}

/// Leftmost match of capture group `group`
///
/// `guard` sees the text before the whole match. A rejected match is
/// retried from the character after its start.
pub(crate) fn find_group_guarded(
    re: &Regex,
    group: usize,
    s: &str,
    guard: impl Fn(&str) -> bool,
) -> Option<Range<usize>> {
    let mut from = 0;
    while from <= s.len() {
        let caps = re.captures_from_pos(s, from).ok().flatten()?;
        let whole = caps.get(0)?;
        if guard(&s[..whole.start()]) {
            if let Some(m) = caps.get(group) {
                return Some(m.start()..m.end());
            }
        }
        from = next_boundary(s, whole.start());
    }
    None
}

fn next_boundary(s: &str, i: usize) -> usize {
    s[i..].chars().next().map_or(s.len() + 1, |c| i + c.len_utf8())
}

/// `s` ends with a period that follows a non-letter
fn ends_with_detached_period(s: &str) -> bool {
    s.ends_with('.') && penultimate_char(s).is_some_and(|c| !is_letter(c))
}

/// No Latin letter, Latin letter plus period, or `@` before a domain name
pub(crate) fn domain_url_may_follow(before: &str) -> bool {
    let trimmed = before.strip_suffix('.').unwrap_or(before);
    !(last_char(trimmed).is_some_and(is_latin_letter) || before.ends_with('@'))
}

/// No letter, digit or one of `-_.@` before a filename
pub(crate) fn filename_may_follow(before: &str) -> bool {
    !(ends_with_letter(before) || ends_with_digit(before) || before.ends_with(['-', '_', '.', '@']))
}

pub(crate) fn email_may_follow(before: &str) -> bool {
    !(ends_with_letter(before) || ends_with_digit(before) || before.ends_with('.'))
}

/// A hashtag or handle starts the text or follows a space or bracketing punctuation
pub(crate) fn hashtag_may_follow(before: &str) -> bool {
    last_char(before).map_or(true, |c| " .,;()[]{}'".contains(c))
}

pub(crate) fn abbrev_product_may_follow(before: &str) -> bool {
    !(ends_with_letter(before) || ends_with_digit(before) || last_char(before).is_some_and(is_dash))
}

pub(crate) fn abbrev_periods_may_follow(before: &str) -> bool {
    !(ends_with_letter(before)
        || ends_with_digit(before)
        || last_char(before).is_some_and(|c| is_dash(c) || c == '.'))
}

/// No letter or apostrophe before a Greek elision
pub(crate) fn greek_contraction_may_follow(before: &str) -> bool {
    !last_char(before).is_some_and(|c| is_letter(c) || APOSTROPHES.contains(c))
}

pub(crate) fn english_clitic_may_follow(before: &str) -> bool {
    last_char(before).is_some_and(|c| c.is_ascii_alphabetic())
}

/// Phonetic initials do not continue a word
pub(crate) fn phonetic_may_follow(before: &str) -> bool {
    !(ends_with_letter(before) || before.ends_with(['.', '\u{200C}', '\u{200D}']))
}

fn ends_with_digit_annex(before: &str, annex: &[char]) -> bool {
    ends_with_digit(before)
        || before
            .strip_suffix(annex)
            .is_some_and(ends_with_digit)
}

/// Hebrew prefix letters that attach to numbers
const HEBREW_PREFIXES: &str = "כבהלשומ";

pub(crate) fn number_may_follow(before: &str) -> bool {
    !(before.ends_with(['-', '−', '–', '+', ','])
        || ends_with_detached_period(before)
        || ends_with_digit_annex(before, &['%', '\''])
        || last_char(before).is_some_and(|c| HEBREW_PREFIXES.contains(c)))
}

pub(crate) fn decimal_comma_number_may_follow(before: &str) -> bool {
    number_may_follow(before) && !before.ends_with(':')
}

pub(crate) fn integer_may_follow(before: &str) -> bool {
    !(before.ends_with(['-', '−', '–', '+'])
        || ends_with_detached_period(before)
        || ends_with_digit_annex(before, &[',', '.', '%', '\''])
        || ends_with_letter(before))
}

pub(crate) fn leading_integer_may_follow(before: &str) -> bool {
    !(ends_with_letter(before)
        || ends_with_digit(before)
        || last_char(before).is_some_and(|c| is_dash(c) || c == '+' || c == '.'))
}

pub(crate) fn multi_dash_name_may_follow(before: &str) -> bool {
    let after_apostrophe = before
        .strip_suffix(|c: char| APOSTROPHES.contains(c))
        .is_some_and(ends_with_letter);
    !(ends_with_letter(before)
        || ends_with_digit(before)
        || last_char(before).is_some_and(|c| is_dash(c) || "—+.".contains(c))
        || after_apostrophe)
}

/// Phonetic spelling of initials, e.g. Hindi `ey.bi.si.` for "ABC"
#[derive(Debug, Clone)]
pub(crate) struct PhoneticPattern {
    /// The initials are capture group 1, after any pre-name titles
    pub re: Regex,
}

/// Patterns that depend on the loaded resources
#[derive(Debug, Clone)]
pub(crate) struct Patterns {
    pub domain_url: Option<Regex>,
    pub phonetics: HashMap<String, Vec<PhoneticPattern>>,
}

fn alternation(items: &[String], upper: bool) -> String {
    let mut items: Vec<String> = items.iter().map(|s| fancy_regex::escape(s).into_owned()).collect();
    if upper {
        let uppers: Vec<String> = items.iter().map(|s| s.to_uppercase()).collect();
        items.extend(uppers);
    }
    // longest first, so `com` is preferred over `co`
    items.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
    items.join("|")
}

fn domain_url_pattern(tlds: &TopLevelDomains) -> String {
    const UL: &str = r"(?:\pL\pM*|\d|[-_])";
    const PATH_CHAR: &str = r"(?:\pL\pM*|\d|[-_,./:;=?@'`~#%&*+])";
    let elem = format!(r"{UL}+\.");
    let elem23 = format!(r"{UL}{{2,3}}\.");
    let elem3 = format!(r"{UL}{{3,}}\.");
    let elem5 = format!(r"{UL}{{5,}}\.");

    let mut alternatives = vec![format!(r"(?:www|WWW)(?:\.{UL}+)+\.(?:[a-z]{{2,4}}|[A-Z]{{2,4}})")];
    if !tlds.high.is_empty() {
        alternatives.push(format!("(?:{elem})+(?:{})", alternation(&tlds.high, true)));
    }
    if !tlds.normal.is_empty() {
        alternatives.push(format!(
            "(?:{elem})*{elem3}(?:{elem})*(?:{})",
            alternation(&tlds.normal, true)
        ));
    }
    if !tlds.low.is_empty() {
        alternatives.push(format!(
            "(?:{elem})*(?:{elem5}(?:{elem})*|{elem3}{elem23})(?:{})",
            alternation(&tlds.low, true)
        ));
    }
    format!(
        r"(?:{})(?:/(?:(?:{PATH_CHAR}|\({PATH_CHAR}\))*(?:\pL\pM*|\d|/))?)?(?!\.?(?=\p{{Latin}})\pL)",
        alternatives.join("|")
    )
}

fn phonetic_patterns(store: &RuleStore, lang: &str) -> Vec<PhoneticPattern> {
    let phonetics = store.phonetics(lang);
    if phonetics.is_empty() {
        return Vec::new();
    }
    let bare: Vec<String> = phonetics.iter().map(|p| p.trim_end_matches('.').to_string()).collect();
    let bare = format!("(?:{})", alternation(&bare, false));
    let dotted = format!(r"(?:{bare}\.)");
    let titles = store.pre_name_titles(lang);
    let pre_name = if titles.is_empty() {
        String::new()
    } else {
        format!("(?:{})*", alternation(titles, false))
    };

    [
        format!(r"(?i){pre_name}({dotted}+{bare})(?!\pL|\pM|\.)"),
        format!(r"(?i){pre_name}({dotted}{{2,}})"),
    ]
    .into_iter()
    .filter_map(|pattern| match Regex::new(&pattern) {
        Ok(re) => Some(PhoneticPattern { re }),
        Err(e) => {
            log::warn!("Could not build phonetic initials pattern for {lang}: {e}");
            None
        }
    })
    .collect()
}

impl Patterns {
    pub fn build(store: &RuleStore, tlds: &TopLevelDomains, languages: &[String]) -> Self {
        let domain_url = match Regex::new(&domain_url_pattern(tlds)) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Could not build domain-name pattern from top-level domains: {e}");
                None
            }
        };
        let phonetics = languages
            .iter()
            .map(|lang| (lang.clone(), phonetic_patterns(store, lang)))
            .filter(|(_, patterns)| !patterns.is_empty())
            .collect();
        Self { domain_url, phonetics }
    }

    pub fn phonetics(&self, lang: Option<&str>) -> &[PhoneticPattern] {
        lang.and_then(|lang| self.phonetics.get(lang))
            .map_or(&[], Vec::as_slice)
    }
}
