//! Context predicates shared by the pipeline stages
//!
//! Token candidates are judged by the characters around them. The general
//! conditions apply to every resource-driven candidate; abbreviation and
//! lexical entries add conditions of their own.

use crate::charclass::{class_of, is_digit, is_letter, is_mark, is_punct, CharClass};
use crate::resource::{DetokRules, RuleEntry};
use regex::Regex;
use std::sync::LazyLock;

static RE_LATIN_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{Latin}&&\pL]$").unwrap());
static RE_HEBREW_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{Hebrew}&&\pL]$").unwrap());

const APOSTROPHE_PLUS: &str = "'‘’`";

pub(crate) fn first_char(s: &str) -> Option<char> {
    s.chars().next()
}

pub(crate) fn last_char(s: &str) -> Option<char> {
    s.chars().next_back()
}

/// Second character of `s`
pub(crate) fn second_char(s: &str) -> Option<char> {
    s.chars().nth(1)
}

/// Second-to-last character of `s`
pub(crate) fn penultimate_char(s: &str) -> Option<char> {
    s.chars().rev().nth(1)
}

pub(crate) fn is_latin_letter(c: char) -> bool {
    let mut buf = [0u8; 4];
    RE_LATIN_LETTER.is_match(c.encode_utf8(&mut buf))
}

pub(crate) fn is_hebrew_letter(c: char) -> bool {
    let mut buf = [0u8; 4];
    RE_HEBREW_LETTER.is_match(c.encode_utf8(&mut buf))
}

pub(crate) fn is_dash(c: char) -> bool {
    matches!(c, '-' | '−' | '–')
}

pub(crate) fn is_apostrophe_plus(c: char) -> bool {
    APOSTROPHE_PLUS.contains(c)
}

/// A letter followed by any combining marks ends `s`
pub(crate) fn ends_with_letter(s: &str) -> bool {
    last_char(s.trim_end_matches(is_mark)).is_some_and(is_letter)
}

pub(crate) fn starts_with_letter(s: &str) -> bool {
    first_char(s).is_some_and(is_letter)
}

pub(crate) fn ends_with_digit(s: &str) -> bool {
    last_char(s).is_some_and(is_digit)
}

pub(crate) fn ends_with_letter_or_digit(s: &str) -> bool {
    ends_with_letter(s) || ends_with_digit(s)
}

pub(crate) fn starts_with_letter_or_digit(s: &str) -> bool {
    first_char(s).is_some_and(|c| is_letter(c) || is_digit(c))
}

/// `s` starts with a digit, optionally after one dash
pub(crate) fn starts_with_dashed_digit(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_dash(c) => chars.next().is_some_and(is_digit),
        Some(c) => is_digit(c),
        None => false,
    }
}

/// One letter (with marks) not followed by another letter or mark
pub(crate) fn starts_with_single_letter(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    if !chars.next().is_some_and(is_letter) {
        return false;
    }
    while chars.peek().is_some_and(|&c| is_mark(c)) {
        chars.next();
    }
    !chars.next().is_some_and(|c| is_letter(c) || is_mark(c))
}

/// A letter or digit ends `s`, or ends its last whitespace-free stretch
fn ends_with_letter_or_digit_in_token(s: &str) -> bool {
    s.rsplit(char::is_whitespace)
        .next()
        .is_some_and(|tail| tail.chars().any(|c| is_letter(c) || is_digit(c)))
}

fn starts_with_letter_or_digit_in_token(s: &str) -> bool {
    s.split(char::is_whitespace)
        .next()
        .is_some_and(|head| head.chars().any(|c| is_letter(c) || is_digit(c)))
}

/// Paired delimiter orientation decided by its neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Orientation {
    Open,
    Close,
}

/// Decide whether a non-directional delimiter such as `"` opens or closes
pub(crate) fn orientation(left: &str, right: &str) -> Option<Orientation> {
    let close = if ends_with_letter_or_digit(left) {
        10
    } else if ends_with_letter_or_digit_in_token(left) {
        5
    } else {
        0
    };
    let open = if starts_with_letter_or_digit(right) {
        10
    } else if starts_with_letter_or_digit_in_token(right) {
        5
    } else {
        0
    };
    match open.cmp(&close) {
        std::cmp::Ordering::Greater => Some(Orientation::Open),
        std::cmp::Ordering::Less => Some(Orientation::Close),
        std::cmp::Ordering::Equal => None,
    }
}

/// Candidate of one or two letters, each with optional marks
fn is_short_letter_token(s: &str) -> bool {
    let mut letters = 0;
    for c in s.chars() {
        if is_letter(c) {
            letters += 1;
        } else if !(is_mark(c) && letters > 0) {
            return false;
        }
    }
    (1..=2).contains(&letters)
}

/// Conditions every resource-driven candidate must meet
#[derive(Clone, Copy)]
pub(crate) struct GeneralConditions<'a> {
    pub lv: CharClass,
    pub detok: &'a DetokRules,
}

impl GeneralConditions<'_> {
    /// `left` and `right` are the contexts within the text being segmented
    pub fn admit(&self, candidate: &str, left: &str, right: &str) -> bool {
        let right0 = first_char(right);
        let left0 = last_char(left);

        // a token ending in a letter can't be followed by a letter
        if right0.is_some_and(is_letter) && ends_with_letter(candidate) {
            return false;
        }
        // nor by an orphan combining mark
        if right0.is_some_and(is_mark) && !last_char(candidate).is_some_and(is_punct) {
            return false;
        }
        if self.lv.intersects(CharClass::QUOTE) {
            // c' inside 'c'
            if starts_with_letter(candidate)
                && last_char(candidate).is_some_and(is_apostrophe_plus)
                && left0.is_some_and(is_apostrophe_plus)
            {
                return false;
            }
            // 'd inside 'd'
            if first_char(candidate).is_some_and(is_apostrophe_plus)
                && ends_with_letter(candidate)
                && right0.is_some_and(is_apostrophe_plus)
            {
                return false;
            }
        }
        // AD inside IA&AD
        if self.lv.intersects(CharClass::AMPERSAND)
            && is_short_letter_token(candidate)
            && (right.starts_with('&') || left.ends_with('&'))
        {
            return false;
        }
        // parts of an attach-tag-decorated token such as @-@
        if self.lv.intersects(CharClass::ATTACH_TAG) {
            let tag = self.detok.attach_tag();
            let is_blank = |c: Option<char>| c.map_or(true, char::is_whitespace);
            if right0 == Some(tag) && self.detok.is_markup_token(candidate) && is_blank(second_char(right)) {
                return false;
            }
            if left0 == Some(tag) && self.detok.is_markup_token(candidate) && is_blank(penultimate_char(left)) {
                return false;
            }
        }
        if self.lv.intersects(CharClass::HEBREW) {
            let hebrew = |c: Option<char>| c.is_some_and(|c| class_of(c).intersects(CharClass::HEBREW));
            // gershayim written as " before the last letter of an acronym
            if candidate == "\"" && hebrew(left0) && hebrew(right0) && starts_with_single_hebrew_letter(right) {
                return false;
            }
            // geresh written as '
            if candidate == "'" && hebrew(left0) {
                return false;
            }
        }
        true
    }

    /// Extra conditions for abbreviation entries
    pub fn admit_abbreviation(&self, candidate: &str, left: &str, right: &str, entry: &RuleEntry) -> bool {
        if entry.sem_class.as_deref() == Some("currency-unit") {
            return true;
        }
        if ends_with_letter_or_digit(candidate)
            && starts_with_dashed_digit(right)
            && !(ends_with_letter(candidate) && entry.conditions.context.right_matches(right))
        {
            return false;
        }
        if candidate.ends_with('.') && starts_with_single_letter(right) {
            let exempt = first_char(right)
                .is_some_and(|c| class_of(c).intersects(CharClass::HANGUL | CharClass::INDIC));
            if !exempt {
                return false;
            }
        }
        if left.ends_with('.') && candidate.contains('.') && ends_with_letter(&left[..left.len() - 1]) {
            return false;
        }
        true
    }

    /// Extra conditions for plain lexical entries
    pub fn admit_lexical(&self, candidate: &str, left: &str, right: &str, entry: &RuleEntry) -> bool {
        let context = &entry.conditions.context;

        if ends_with_letter_or_digit(candidate) && starts_with_letter_or_digit(right) {
            let letter_then_number =
                ends_with_letter(candidate) && starts_with_dashed_digit(right) && context.right_matches(right);
            let number_then_letter =
                ends_with_digit(candidate) && starts_with_letter(right) && context.right_matches(right);
            if !(letter_then_number || number_then_letter) {
                return false;
            }
        }
        if ends_with_letter_or_digit(left) && starts_with_letter_or_digit(candidate) {
            let unit_after_number =
                ends_with_digit(left) && entry.sem_class.as_deref() == Some("unit-of-measurement");
            let number_after_letter =
                ends_with_letter(left) && starts_with_dashed_digit(candidate) && context.left_matches(left);
            let letter_after_number =
                ends_with_digit(left) && starts_with_letter(candidate) && context.left_matches(left);
            let script_change = self.lv.intersects(CharClass::INDIC | CharClass::HANGUL)
                && last_char(left).is_some_and(is_latin_letter)
                && first_char(candidate)
                    .is_some_and(|c| class_of(c).intersects(CharClass::INDIC | CharClass::HANGUL));
            if !(unit_after_number || number_after_letter || letter_after_number || script_change) {
                return false;
            }
        }
        // d' inside d's
        if last_char(candidate).is_some_and(is_apostrophe_plus) && starts_with_single_s(right) {
            return false;
        }
        true
    }
}

fn starts_with_single_hebrew_letter(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    if !chars.next().is_some_and(is_hebrew_letter) {
        return false;
    }
    while chars.peek().is_some_and(|&c| is_mark(c)) {
        chars.next();
    }
    match chars.next() {
        Some('\'') => !chars.next().is_some_and(is_letter),
        Some(c) => !is_letter(c),
        None => true,
    }
}

fn starts_with_single_s(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('s' | 'S')) && !chars.next().is_some_and(|c| is_letter(c) || is_digit(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::RuleStore;

    fn store(line: &str) -> RuleStore {
        let mut store = RuleStore::new();
        store.load_str(line, "test");
        store
    }

    #[test]
    fn test_char_predicates() {
        assert!(ends_with_letter("cafe\u{301}"));
        assert!(!ends_with_letter("abc."));
        assert!(starts_with_dashed_digit("-5"));
        assert!(starts_with_dashed_digit("5"));
        assert!(!starts_with_dashed_digit("-x"));
        assert!(starts_with_single_letter("a b"));
        assert!(!starts_with_single_letter("ab"));
        assert!(is_latin_letter('é'));
        assert!(!is_latin_letter('я'));
    }

    #[test]
    fn test_orientation() {
        assert_eq!(orientation("", "Hello\" he said"), Some(Orientation::Open));
        assert_eq!(orientation("he said \"Hello", ""), Some(Orientation::Close));
        assert_eq!(orientation("said ", " now"), None);
        assert_eq!(orientation("(x)", " y"), Some(Orientation::Close));
    }

    #[test]
    fn test_general_conditions() {
        let detok = DetokRules::new();
        let general = GeneralConditions {
            lv: CharClass::QUOTE | CharClass::AMPERSAND,
            detok: &detok,
        };
        assert!(general.admit("Dr.", "see ", " Smith"));
        assert!(!general.admit("Dr", "", "ive"));
        assert!(!general.admit("c'", "'", ""));
        assert!(!general.admit("AD", "IA&", ""));
        assert!(general.admit("U.S.", "the ", " army"));
    }

    #[test]
    fn test_attach_tag_condition() {
        let mut detok = DetokRules::new();
        detok.load_str("::markup-attach - ::group True\n", "detok-test", &[]);
        let general = GeneralConditions {
            lv: CharClass::ATTACH_TAG,
            detok: &detok,
        };
        assert!(!general.admit("-", "well @", "@ known"));
        assert!(!general.admit("-", "well @", "@"));
        assert!(general.admit("-", "well ", " known"));
    }

    #[test]
    fn test_abbreviation_conditions() {
        let detok = DetokRules::new();
        let general = GeneralConditions {
            lv: CharClass::NONE,
            detok: &detok,
        };
        let store = store("::abbrev No. ::exp number\n::abbrev Art ::right-context \\s*\\d\n::abbrev e.g.\n");
        let no = &store.entries("no.")[0];
        assert!(general.admit_abbreviation("No.", "", " 5", no));
        assert!(!general.admit_abbreviation("No.", "", "a", no));
        let art = &store.entries("art")[0];
        assert!(!general.admit_abbreviation("Art", "", "5", &store.entries("no.")[0]));
        assert!(general.admit_abbreviation("Art", "", "5", art));
        let eg = &store.entries("e.g.")[0];
        assert!(!general.admit_abbreviation("e.g.", "x.", "", eg));
    }

    #[test]
    fn test_lexical_conditions() {
        let detok = DetokRules::new();
        let general = GeneralConditions {
            lv: CharClass::NONE,
            detok: &detok,
        };
        let store = store("::lexical km ::sem-class unit-of-measurement\n::lexical d'\n::lexical new\n");
        let km = &store.entries("km")[0];
        assert!(general.admit_lexical("km", "5", " away", km));
        let new = &store.entries("new")[0];
        assert!(!general.admit_lexical("new", "re", "", new));
        assert!(!general.admit_lexical("new", "", "er", new));
        let d = &store.entries("d'")[0];
        assert!(!general.admit_lexical("d'", "", "s", d));
        assert!(general.admit_lexical("d'", "", "accord", d));
    }
}
