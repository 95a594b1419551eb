//! Detokenization rules: auto-attach, markup-attach and re-fusable contractions
//!
//! Loaded from `detok-resource.txt` and, for their contractions and
//! `DECONTRACTION-*` lexical tags, from the tokenization resource files.
//! The tokenizer consults the same rules to decide which punctuation gets
//! attach-tag markup such as `@-@`.

use super::entry::Conditions;
use super::expand::expand_line;
use super::line::{is_blank, split_lang_codes, strip_comment, SlotLine, DETOK_SCHEMA};
use super::{lowercase, LoadReport, WarningKind};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

/// Heads that only matter to tokenization
static RE_TOK_ONLY_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^::(?:repair|punct-split|abbrev|misspelling)\b").unwrap());

pub const DEFAULT_ATTACH_TAG: char = '@';

/// A rule that lets a token attach to a neighbor without a space
#[derive(Debug, Clone)]
pub struct AttachRule {
    pub surface: String,
    /// Also applies to runs of the same character, such as `---`
    pub group: bool,
    pub conditions: Conditions,
}

impl AttachRule {
    fn new(surface: &str, group: bool, conditions: Conditions) -> Self {
        Self {
            surface: surface.to_string(),
            group,
            conditions,
        }
    }

    /// Check language, case, group and context conditions in that order
    pub fn admits(
        &self,
        token: &str,
        left: &str,
        right: &str,
        lang: Option<&str>,
        group_required: bool,
    ) -> bool {
        self.conditions.admits_language(lang)
            && (!self.conditions.case_sensitive || token == self.surface)
            && (!group_required || self.group)
            && self.conditions.context.admits(left, right)
    }
}

/// Punctuation the tokenizer decorates with the attach tag
#[derive(Debug, Clone)]
pub struct MarkupRule {
    pub rule: AttachRule,
    /// Non-directional delimiter such as `"`, decorated as opening or closing
    pub paired_delimiter: bool,
    /// Decorated forms that revert to the bare token
    pub exceptions: Vec<String>,
}

/// Token sequence that re-fuses into a contraction, e.g. `do n't` into `don't`
#[derive(Debug, Clone)]
pub struct ContractionRule {
    /// `surface` holds the space-separated token sequence
    pub rule: AttachRule,
    pub contraction: String,
}

#[derive(Debug, Clone)]
pub struct DetokRules {
    attach_tag: char,
    auto_attach_left: HashMap<String, Vec<AttachRule>>,
    auto_attach_right: HashMap<String, Vec<AttachRule>>,
    seen_left: HashSet<String>,
    seen_right: HashSet<String>,
    markup_attach: HashMap<String, Vec<MarkupRule>>,
    markup_elements: BTreeSet<String>,
    markup_re: Option<Regex>,
    contractions: HashMap<String, Vec<ContractionRule>>,
}

impl Default for DetokRules {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl DetokRules {
    pub fn new() -> Self {
        let mut rules = Self {
            attach_tag: DEFAULT_ATTACH_TAG,
            auto_attach_left: HashMap::new(),
            auto_attach_right: HashMap::new(),
            seen_left: HashSet::new(),
            seen_right: HashSet::new(),
            markup_attach: HashMap::new(),
            markup_elements: BTreeSet::new(),
            markup_re: None,
            contractions: HashMap::new(),
        };
        rules.rebuild_markup();
        rules
    }

    pub fn attach_tag(&self) -> char {
        self.attach_tag
    }

    /// Replace the attach tag, e.g. with one chosen by configuration
    pub fn set_attach_tag(&mut self, tag: char) {
        self.attach_tag = tag;
        self.rebuild_markup();
    }

    /// True for tokens such as `@-@`, `@,` or a bare `/`
    pub fn is_markup_token(&self, token: &str) -> bool {
        self.markup_re.as_ref().is_some_and(|re| re.is_match(token))
    }

    pub fn markup_rules(&self, key: &str) -> &[MarkupRule] {
        self.markup_attach.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn has_markup_rules(&self, key: &str) -> bool {
        self.markup_attach.contains_key(key)
    }

    /// Contraction rules keyed by lowercase space-joined tokens
    pub fn contractions(&self, key: &str) -> &[ContractionRule] {
        self.contractions.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn attaches_left(&self, token: &str, left: &str, right: &str, lang: Option<&str>) -> bool {
        Self::attaches(&self.auto_attach_left, token, left, right, lang)
    }

    pub fn attaches_right(&self, token: &str, left: &str, right: &str, lang: Option<&str>) -> bool {
        Self::attaches(&self.auto_attach_right, token, left, right, lang)
    }

    fn attaches(
        rules: &HashMap<String, Vec<AttachRule>>,
        token: &str,
        left: &str,
        right: &str,
        lang: Option<&str>,
    ) -> bool {
        let key = lowercase(token);
        if rules
            .get(&key)
            .is_some_and(|rules| rules.iter().any(|r| r.admits(token, left, right, lang, false)))
        {
            return true;
        }
        let Some(first) = key.chars().next() else {
            return false;
        };
        if key.chars().all(|c| c == first) {
            let mut buf = [0u8; 4];
            let first: &str = first.encode_utf8(&mut buf);
            if let Some(rules) = rules.get(first) {
                return rules.iter().any(|r| r.admits(token, left, right, lang, true));
            }
        }
        false
    }

    fn rebuild_markup(&mut self) {
        let tag = regex::escape(&self.attach_tag.to_string());
        let mut elements: Vec<&str> = self.markup_elements.iter().map(String::as_str).collect();
        if !self.markup_elements.contains("/") {
            elements.push("/");
        }
        elements.sort_by_key(|element| std::cmp::Reverse(element.len()));
        let pattern = format!("(?:{tag}?(?:{}){tag}?|{tag}{tag})", elements.join("|"));
        self.markup_re = match Regex::new(&format!("(?i)^{pattern}$")) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Could not build markup-attach pattern: {e}");
                None
            }
        };
    }

    fn register_auto_attach(&mut self, side: Side, key: &str, rule: AttachRule, report: &mut LoadReport, line: usize) {
        let (rules, seen) = match side {
            Side::Left => (&mut self.auto_attach_left, &mut self.seen_left),
            Side::Right => (&mut self.auto_attach_right, &mut self.seen_right),
        };
        let codes: Vec<Option<&String>> = if rule.conditions.lang_codes.is_empty() {
            vec![None]
        } else {
            rule.conditions.lang_codes.iter().map(Some).collect()
        };
        let mut duplicates = Vec::new();
        for code in codes {
            let seen_key = format!("{} {key}", code.map_or("-", String::as_str));
            if !seen.insert(seen_key) {
                duplicates.push(WarningKind::DuplicateAutoAttach {
                    surface: key.to_string(),
                    side: side.name(),
                    lcode_clause: code.map(|c| format!(" ::lcode {c}")).unwrap_or_default(),
                });
            }
        }
        rules.entry(key.to_string()).or_default().push(rule);
        report.warn(line, duplicates);
    }

    /// Load rules from resource text
    ///
    /// Lines whose `::lcode` shares no language with `doc_langs` are skipped
    /// unless `doc_langs` is empty.
    pub fn load_str(&mut self, text: &str, source: &str, doc_langs: &[String]) -> LoadReport {
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
                if is_blank(line) || RE_TOK_ONLY_HEAD.is_match(line) {
                    continue;
                }
                let problems = DETOK_SCHEMA.validate(line);
                if !problems.is_empty() {
                    report.warn(line_number, problems);
                    continue;
                }
                let slots = SlotLine::parse(line);
                let line_langs = slots.value("lcode").map(split_lang_codes).unwrap_or_default();
                if !doc_langs.is_empty()
                    && !line_langs.is_empty()
                    && !line_langs.iter().any(|code| doc_langs.contains(code))
                {
                    continue;
                }
                if self.load_line(&slots, &mut report, line_number) {
                    report.entries += 1;
                }
            }
        }
        self.rebuild_markup();
        report.log_summary();
        report
    }

    fn load_line(&mut self, line: &SlotLine, report: &mut LoadReport, line_number: usize) -> bool {
        let Some((head, surface)) = line.head() else {
            return false;
        };
        let key = lowercase(surface);
        let mut warnings = Vec::new();
        let conditions = Conditions::from_line(line, surface, &mut warnings);
        report.warn(line_number, warnings);

        match head {
            "auto-attach" => {
                let side = line.value("side").unwrap_or_default();
                let sides: &[Side] = match side {
                    "left" => &[Side::Left],
                    "right" => &[Side::Right],
                    "both" => &[Side::Left, Side::Right],
                    _ => {
                        report.warn(line_number, [WarningKind::InvalidAttachSide(side.to_string())]);
                        return false;
                    }
                };
                let rule = AttachRule::new(surface, line.flag("group"), conditions);
                for &side in sides {
                    self.register_auto_attach(side, &key, rule.clone(), report, line_number);
                }
                true
            }
            "markup-attach" => {
                let group = line.flag("group");
                let exceptions = line
                    .value("except")
                    .map(|value| value.split_whitespace().map(str::to_string).collect())
                    .unwrap_or_default();
                let element = regex::escape(&key) + if group { "+" } else { "" };
                self.markup_elements.insert(element);
                self.markup_attach.entry(key).or_default().push(MarkupRule {
                    rule: AttachRule::new(surface, group, conditions),
                    paired_delimiter: line.flag("paired-delimiter"),
                    exceptions,
                });
                true
            }
            "attach-tag" => {
                let mut chars = surface.chars();
                match (chars.next(), chars.next()) {
                    (Some(tag), None) if !tag.is_whitespace() => {
                        self.attach_tag = tag;
                        true
                    }
                    _ => {
                        report.warn(line_number, [WarningKind::InvalidAttachTag(surface.to_string())]);
                        false
                    }
                }
            }
            "contraction" => {
                if line.has("nonstandard") || line.has("substandard") {
                    return false;
                }
                let Some(target) = line.value("target") else {
                    return false;
                };
                self.contractions
                    .entry(lowercase(target))
                    .or_default()
                    .push(ContractionRule {
                        rule: AttachRule::new(target, false, conditions),
                        contraction: surface.to_string(),
                    });
                true
            }
            "lexical" => {
                let tag = line.value("tag").unwrap_or_default();
                let (left, right) = match tag {
                    "DECONTRACTION-L" => (false, true),
                    "DECONTRACTION-R" => (true, false),
                    "DECONTRACTION-B" => (true, true),
                    _ => return false,
                };
                let rule = AttachRule::new(surface, false, conditions);
                if right {
                    self.auto_attach_right.entry(key.clone()).or_default().push(rule.clone());
                }
                if left {
                    self.auto_attach_left.entry(key).or_default().push(rule);
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = "\
::markup-attach - ::group True
::markup-attach , ::except @,
::markup-attach \" ::paired-delimiter True
::auto-attach . ::side left ::group True
::auto-attach ( ::side right
::auto-attach n't ::side left
::auto-attach , ::side left
::auto-attach , ::side left
::auto-attach ? ::side left ::lcode-not fra
";

    fn rules() -> (DetokRules, LoadReport) {
        let mut rules = DetokRules::new();
        let report = rules.load_str(RULES, "detok-test", &[]);
        (rules, report)
    }

    #[test]
    fn test_markup_tokens() {
        let (rules, _) = rules();
        for token in ["@-@", "@---@", "-", "@,", "\"@", "@\"", "/", "@@"] {
            assert!(rules.is_markup_token(token), "{token}");
        }
        for token in ["a", "@a@", "-a", "@.@"] {
            assert!(!rules.is_markup_token(token), "{token}");
        }
        assert_eq!(rules.markup_rules(",")[0].exceptions, vec!["@,"]);
        assert!(rules.markup_rules("\"")[0].paired_delimiter);
    }

    #[test]
    fn test_auto_attach_with_group_fallback() {
        let (rules, _) = rules();
        assert!(rules.attaches_left(".", "word", "", None));
        assert!(rules.attaches_left("...", "word", "", None));
        assert!(rules.attaches_right("(", "", "x", None));
        assert!(!rules.attaches_right("((", "", "x", None));
        assert!(rules.attaches_left("N'T", "do", "", None));
        assert!(rules.attaches_left("?", "", "", Some("eng")));
        assert!(!rules.attaches_left("?", "", "", Some("fra")));
    }

    #[test]
    fn test_duplicate_auto_attach_warned() {
        let (_, report) = rules();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line, 8);
        assert!(matches!(
            report.warnings[0].kind,
            WarningKind::DuplicateAutoAttach { side: "left", .. }
        ));
    }

    #[test]
    fn test_contractions_from_tok_resource() {
        let mut rules = DetokRules::new();
        rules.load_str(
            "::contraction don't ::target do n't\n\
             ::contraction dont ::target do n't ::nonstandard True\n\
             ::abbrev Dr. ::exp Doctor\n\
             ::lexical 's ::tag DECONTRACTION-R\n",
            "tok-test",
            &["eng".to_string()],
        );
        let fused: Vec<&str> = rules
            .contractions("do n't")
            .iter()
            .map(|c| c.contraction.as_str())
            .collect();
        assert_eq!(fused, vec!["don't"]);
        assert!(rules.contractions("do n’t").len() == 1);
        assert!(rules.attaches_left("'s", "John", "", Some("eng")));
        assert!(!rules.attaches_right("'s", "John", "", Some("eng")));
    }

    #[test]
    fn test_language_filter_and_attach_tag() {
        let mut rules = DetokRules::new();
        rules.load_str(
            "::attach-tag ~\n::auto-attach « ::side right ::lcode fra\n::markup-attach -\n",
            "detok-test",
            &["eng".to_string()],
        );
        assert_eq!(rules.attach_tag(), '~');
        assert!(!rules.attaches_right("«", "", "x", None));
        assert!(rules.is_markup_token("~-~"));
        assert!(!rules.is_markup_token("@-@"));
    }
}
