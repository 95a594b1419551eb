//! Tokenization rule store
//!
//! Entries are keyed by their lowercase surface. Three prefix tries bound
//! the candidate search of the pipeline stages that consult the store:
//! punctuation splits, plain lexical items, and everything else.

use super::entry::{Conditions, RuleEntry, RuleKind, SplitSide};
use super::expand::expand_line;
use super::line::{is_blank, split_list, strip_comment, SlotLine, TOK_SCHEMA};
use super::trie::PrefixTrie;
use super::{lowercase, LoadReport, WarningKind};
use std::collections::HashMap;

/// Prefix trie consulted by a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixClass {
    /// Abbreviations, contractions, repairs, priority lexical items
    Main,
    Lexical,
    Punct,
}

#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    entries: HashMap<String, Vec<RuleEntry>>,
    main_prefixes: PrefixTrie,
    lexical_prefixes: PrefixTrie,
    punct_prefixes: PrefixTrie,
    pre_name_titles: HashMap<String, Vec<String>>,
    phonetics: HashMap<String, Vec<String>>,
    len: usize,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn trie(&self, class: PrefixClass) -> &PrefixTrie {
        match class {
            PrefixClass::Main => &self.main_prefixes,
            PrefixClass::Lexical => &self.lexical_prefixes,
            PrefixClass::Punct => &self.punct_prefixes,
        }
    }

    /// Register `entry` under its lowercase surface
    pub fn insert(&mut self, entry: RuleEntry, class: PrefixClass) {
        let key = lowercase(&entry.surface);
        match class {
            PrefixClass::Main => self.main_prefixes.insert(&key),
            PrefixClass::Lexical => self.lexical_prefixes.insert(&key),
            PrefixClass::Punct => self.punct_prefixes.insert(&key),
        }
        self.entries.entry(key).or_default().push(entry);
        self.len += 1;
    }

    /// Entries registered under lowercase `key`
    pub fn entries(&self, key: &str) -> &[RuleEntry] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    /// Candidate matches starting at `start` of the lowercased text `lc`
    ///
    /// Yields `(end, entries)` pairs from the longest candidate down.
    pub fn candidates<'a>(
        &'a self,
        class: PrefixClass,
        lc: &'a [char],
        start: usize,
    ) -> impl Iterator<Item = (usize, &'a [RuleEntry])> + 'a {
        self.trie(class)
            .surface_ends(lc, start)
            .into_iter()
            .map(move |end| {
                let key: String = lc[start..end].iter().collect();
                (end, self.entries(&key))
            })
    }

    /// Lowercase pre-name titles (`::sem-class pre-name-title`) for `lang`
    pub fn pre_name_titles(&self, lang: &str) -> &[String] {
        self.pre_name_titles.get(lang).map_or(&[], Vec::as_slice)
    }

    /// Lowercase phonetic spellings (`::token-category phonetics`) for `lang`
    pub fn phonetics(&self, lang: &str) -> &[String] {
        self.phonetics.get(lang).map_or(&[], Vec::as_slice)
    }

    /// Load rules from the text of a tokenization resource file
    pub fn load_str(&mut self, text: &str, source: &str) -> LoadReport {
        let mut report = LoadReport::new(source);
        for (idx, raw) in text.lines().enumerate() {
            let line_number = idx + 1;
            report.lines = line_number;
            let line = strip_comment(raw);
            if line.trim().is_empty() {
                continue;
            }
            let expanded = expand_line(line);
            report.expanded_lines += expanded.len() - 1;
            for line in &expanded {
                if is_blank(line) {
                    continue;
                }
                let problems = TOK_SCHEMA.validate(line);
                if !problems.is_empty() {
                    report.warn(line_number, problems);
                    continue;
                }
                if !line.trim_start_matches('\u{FEFF}').starts_with("::") {
                    continue;
                }
                let slots = SlotLine::parse(line);
                let mut warnings = Vec::new();
                if let Some((entry, class)) = build_entry(&slots, &mut warnings) {
                    self.register_lists(&slots, &lowercase(&entry.surface));
                    self.insert(entry, class);
                    report.entries += 1;
                }
                report.warn(line_number, warnings);
            }
        }
        report.log_summary();
        report
    }

    fn register_lists(&mut self, line: &SlotLine, key: &str) {
        let Some(lang) = line.value("lcode") else {
            return;
        };
        if line.value("sem-class") == Some("pre-name-title") {
            self.pre_name_titles
                .entry(lang.to_string())
                .or_default()
                .push(key.to_string());
        }
        if line.value("token-category") == Some("phonetics") {
            self.phonetics
                .entry(lang.to_string())
                .or_default()
                .push(key.to_string());
        }
    }
}

fn parse_char_splits(
    value: &str,
    surface: &str,
    target: &str,
    warnings: &mut Vec<WarningKind>,
) -> Option<Vec<usize>> {
    let splits: Result<Vec<usize>, _> = value
        .split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect();
    let Ok(splits) = splits else {
        warnings.push(WarningKind::CharSplitSyntax(value.to_string()));
        return None;
    };
    let targets = target.split_whitespace().count();
    if targets != splits.len() {
        warnings.push(WarningKind::CharSplitCount {
            targets,
            splits: splits.len(),
        });
        return None;
    }
    let length = surface.chars().count();
    let sum: usize = splits.iter().sum();
    if length != sum {
        warnings.push(WarningKind::CharSplitLength { length, sum });
        return None;
    }
    Some(splits)
}

/// Build the entry described by a validated line
fn build_entry(line: &SlotLine, warnings: &mut Vec<WarningKind>) -> Option<(RuleEntry, PrefixClass)> {
    let (head, surface) = line.head()?;
    if surface.is_empty() {
        return None;
    }
    let sem_class = line.value("sem-class");
    let (kind, class) = match head {
        "abbrev" => (
            RuleKind::Abbreviation {
                expansions: line.value("exp").map(split_list).unwrap_or_default(),
            },
            PrefixClass::Main,
        ),
        "contraction" => {
            let target = line.value("target")?;
            let char_splits = line
                .value("char-split")
                .and_then(|value| parse_char_splits(value, surface, target, warnings));
            (
                RuleKind::Contraction {
                    target: target.to_string(),
                    char_splits,
                },
                PrefixClass::Main,
            )
        }
        "lexical" => {
            if line.flag("priority")
                || sem_class == Some("url")
                || surface.chars().any(|c| c.is_numeric())
            {
                (RuleKind::LexicalPriority, PrefixClass::Main)
            } else {
                (RuleKind::Lexical, PrefixClass::Lexical)
            }
        }
        "punct-split" => {
            let side_value = line.value("side").unwrap_or_default();
            let Some(side) = SplitSide::parse(side_value) else {
                warnings.push(WarningKind::InvalidSide(side_value.to_string()));
                return None;
            };
            (
                RuleKind::PunctSplit {
                    side,
                    group: line.flag("group"),
                },
                PrefixClass::Punct,
            )
        }
        "repair" => (
            RuleKind::Repair {
                target: line.value("target")?.to_string(),
            },
            PrefixClass::Main,
        ),
        "non-symbol" => (RuleKind::NonSymbol, PrefixClass::Main),
        _ => return None,
    };

    let mut entry = RuleEntry::new(surface, kind);
    entry.sem_class = sem_class.map(str::to_string);
    entry.tag = line.value("tag").map(str::to_string);
    entry.conditions = Conditions::from_line(line, surface, warnings);
    // Positive language lists only filter detokenization rules
    entry.conditions.lang_codes.clear();
    Some((entry, class))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_load_and_lookup() {
        let mut store = RuleStore::new();
        let report = store.load_str(
            "# abbreviations\n\
             ::abbrev U.S. ::exp United States\n\
             ::abbrev U. ::exp University\n\
             ::contraction won't ::target will n't ::char-split 2,3\n\
             ::punct-split . ::side end\n\
             ::lexical Stratford-upon-Avon ::sem-class city\n",
            "test",
        );
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.lines, 6);
        assert!(report.entries >= 5);

        let text = chars("the u.s. army");
        let ends: Vec<usize> = store
            .candidates(PrefixClass::Main, &text, 4)
            .map(|(end, _)| end)
            .collect();
        assert_eq!(ends, vec![8, 6]);

        let won = store.entries("won't");
        assert!(matches!(
            &won[0].kind,
            RuleKind::Contraction { char_splits: Some(splits), .. } if splits == &[2, 3]
        ));
        assert!(!store.entries("won’t").is_empty());
        assert!(store
            .candidates(PrefixClass::Lexical, &chars("stratford-upon-avon"), 0)
            .next()
            .is_some());
        assert!(store
            .candidates(PrefixClass::Punct, &chars("."), 0)
            .next()
            .is_some());
    }

    #[test]
    fn test_mismatched_char_split_rejected() {
        let mut store = RuleStore::new();
        let report = store.load_str("::contraction won't ::target will n't ::char-split 4,3\n", "test");
        assert!(report.warnings.iter().any(|w| matches!(
            w.kind,
            WarningKind::CharSplitLength { length: 5, sum: 7 }
        )));
        assert!(matches!(
            &store.entries("won't")[0].kind,
            RuleKind::Contraction { char_splits: None, .. }
        ));
    }

    #[test]
    fn test_invalid_lines_skipped() {
        let mut store = RuleStore::new();
        let report = store.load_str(
            "::contraction don't\n::punct-split ! ::side middle\n::lexical ok\n",
            "test",
        );
        assert_eq!(report.warnings.len(), 2);
        assert!(store.entries("don't").is_empty());
        assert!(store.entries("!").is_empty());
        assert_eq!(store.entries("ok").len(), 1);
        assert_eq!(report.warnings[0].line, 1);
    }

    #[test]
    fn test_priority_lexical() {
        let mut store = RuleStore::new();
        store.load_str(
            "::lexical ebay.com ::sem-class url\n::lexical 3D\n::lexical New York ::priority True\n",
            "test",
        );
        for key in ["ebay.com", "3d", "new york"] {
            assert!(
                matches!(store.entries(key)[0].kind, RuleKind::LexicalPriority),
                "{key}"
            );
        }
    }

    #[test]
    fn test_language_lists() {
        let mut store = RuleStore::new();
        store.load_str(
            "::abbrev Dr. ::sem-class pre-name-title ::lcode eng\n\
             ::abbrev Ey. ::token-category phonetics ::lcode hin\n",
            "test",
        );
        assert_eq!(store.pre_name_titles("eng"), &["dr.".to_string()]);
        assert_eq!(store.phonetics("hin"), &["ey.".to_string()]);
        assert!(store.phonetics("eng").is_empty());
    }
}
