//! Typed rule entries and their applicability conditions

use super::line::{split_lang_codes, SlotLine};
use super::WarningKind;
use fancy_regex::Regex;

/// Which side of a punctuation character is split off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSide {
    Start,
    End,
    Both,
}

impl SplitSide {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Kind-specific payload of a tokenization rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Abbreviation {
        expansions: Vec<String>,
    },
    Contraction {
        target: String,
        /// Characters of the surface covered by each target token
        char_splits: Option<Vec<usize>>,
    },
    Repair {
        target: String,
    },
    Lexical,
    /// Lexical item applied early: URLs, items with digits, `::priority`
    LexicalPriority,
    PunctSplit {
        side: SplitSide,
        group: bool,
    },
    NonSymbol,
}

/// Context patterns attached to a rule
///
/// Left patterns must match at the end of the left context, right patterns
/// at the start of the right context. Patterns may use look-around.
#[derive(Debug, Clone, Default)]
pub struct ContextMatchers {
    left: Option<Regex>,
    left_not: Option<Regex>,
    right: Option<Regex>,
    right_not: Option<Regex>,
}

fn compile_context(
    line: &SlotLine,
    slot: &str,
    surface: &str,
    warnings: &mut Vec<WarningKind>,
) -> Option<Regex> {
    let pattern = line.value(slot)?;
    let anchored = if slot.starts_with("left") {
        format!("(?:{pattern})$")
    } else {
        format!("^(?:{pattern})")
    };
    match Regex::new(&anchored) {
        Ok(re) => Some(re),
        Err(_) => {
            warnings.push(WarningKind::RegexCompile {
                surface: surface.to_string(),
                slot: slot.to_string(),
                pattern: pattern.to_string(),
            });
            None
        }
    }
}

fn is_match(re: &Regex, text: &str) -> bool {
    re.is_match(text).unwrap_or(false)
}

impl ContextMatchers {
    /// Compile the context slots of `line`; failing patterns are skipped with a warning
    pub fn from_line(line: &SlotLine, surface: &str, warnings: &mut Vec<WarningKind>) -> Self {
        Self {
            left: compile_context(line, "left-context", surface, warnings),
            left_not: compile_context(line, "left-context-not", surface, warnings),
            right: compile_context(line, "right-context", surface, warnings),
            right_not: compile_context(line, "right-context-not", surface, warnings),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none()
            && self.left_not.is_none()
            && self.right.is_none()
            && self.right_not.is_none()
    }

    /// True if a `::left-context` pattern exists and matches
    pub fn left_matches(&self, left: &str) -> bool {
        self.left.as_ref().is_some_and(|re| is_match(re, left))
    }

    /// True if a `::right-context` pattern exists and matches
    pub fn right_matches(&self, right: &str) -> bool {
        self.right.as_ref().is_some_and(|re| is_match(re, right))
    }

    pub fn admits(&self, left: &str, right: &str) -> bool {
        self.left.as_ref().map_or(true, |re| is_match(re, left))
            && self.left_not.as_ref().map_or(true, |re| !is_match(re, left))
            && self.right.as_ref().map_or(true, |re| is_match(re, right))
            && self.right_not.as_ref().map_or(true, |re| !is_match(re, right))
    }
}

/// Conditions shared by tokenization and detokenization rules
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    pub case_sensitive: bool,
    pub lang_codes: Vec<String>,
    pub lang_codes_not: Vec<String>,
    pub context: ContextMatchers,
}

impl Conditions {
    pub fn from_line(line: &SlotLine, surface: &str, warnings: &mut Vec<WarningKind>) -> Self {
        Self {
            case_sensitive: line.flag("case-sensitive"),
            lang_codes: line.value("lcode").map(split_lang_codes).unwrap_or_default(),
            lang_codes_not: line
                .value("lcode-not")
                .map(split_lang_codes)
                .unwrap_or_default(),
            context: ContextMatchers::from_line(line, surface, warnings),
        }
    }

    /// False if `lang` is explicitly excluded
    pub fn admits_excluded_language(&self, lang: Option<&str>) -> bool {
        lang.map_or(true, |lang| !self.lang_codes_not.iter().any(|code| code == lang))
    }

    /// False if `lang` is excluded or a positive language list leaves it out
    pub fn admits_language(&self, lang: Option<&str>) -> bool {
        self.admits_excluded_language(lang)
            && lang.map_or(true, |lang| {
                self.lang_codes.is_empty() || self.lang_codes.iter().any(|code| code == lang)
            })
    }
}

/// A tokenization rule loaded from a resource file
#[derive(Debug, Clone)]
pub struct RuleEntry {
    /// Surface as authored (the lookup key is its lowercase form)
    pub surface: String,
    pub kind: RuleKind,
    pub sem_class: Option<String>,
    pub tag: Option<String>,
    pub conditions: Conditions,
}

impl RuleEntry {
    pub fn new(surface: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            surface: surface.into(),
            kind,
            sem_class: None,
            tag: None,
            conditions: Conditions::default(),
        }
    }

    /// Check case sensitivity, language exclusion and context patterns
    ///
    /// `left` and `right` are the full-line contexts around `candidate`.
    pub fn admits(&self, candidate: &str, left: &str, right: &str, lang: Option<&str>) -> bool {
        (!self.conditions.case_sensitive || candidate == self.surface)
            && self.conditions.context.admits(left, right)
            && self.conditions.admits_excluded_language(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_from(line: &str) -> (RuleEntry, Vec<WarningKind>) {
        let line = SlotLine::parse(line);
        let mut warnings = Vec::new();
        let surface = line.head_value().unwrap_or_default().to_string();
        let mut entry = RuleEntry::new(surface.clone(), RuleKind::Lexical);
        entry.conditions = Conditions::from_line(&line, &surface, &mut warnings);
        (entry, warnings)
    }

    #[test]
    fn test_context_conditions() {
        let (entry, warnings) =
            entry_from(r"::lexical No. ::left-context-not \d\s* ::right-context \s*\d");
        assert!(warnings.is_empty());
        assert!(entry.admits("No.", "see ", " 5", None));
        assert!(!entry.admits("No.", "see 3 ", " 5", None));
        assert!(!entry.admits("No.", "see ", " five", None));
    }

    #[test]
    fn test_lookaround_context() {
        let (entry, _) = entry_from(r"::lexical in ::right-context-not \s+(?=the\b)");
        assert!(entry.admits("in", "", " a box", None));
        assert!(!entry.admits("in", "", " the box", None));
    }

    #[test]
    fn test_case_sensitive_and_language() {
        let (entry, _) = entry_from("::lexical US ::case-sensitive True ::lcode-not deu");
        assert!(entry.admits("US", "", "", Some("eng")));
        assert!(!entry.admits("us", "", "", Some("eng")));
        assert!(!entry.admits("US", "", "", Some("deu")));
    }

    #[test]
    fn test_bad_pattern_skipped() {
        let (entry, warnings) = entry_from("::lexical x ::left-context [unclosed");
        assert_eq!(warnings.len(), 1);
        assert!(entry.conditions.context.is_empty());
        assert!(entry.admits("x", "anything", "", None));
    }

    #[test]
    fn test_positive_language_list() {
        let (entry, _) = entry_from("::lexical x ::lcode eng;fra");
        assert!(entry.conditions.admits_language(Some("fra")));
        assert!(!entry.conditions.admits_language(Some("deu")));
        assert!(entry.conditions.admits_language(None));
    }
}
