//! Double-colon rule lines: comment stripping, slot access, validation
//!
//! A rule line is a sequence of `::slot value` pairs, for example
//! `::contraction won't ::target will n't ::char-split 2,3`. The first slot
//! is the head slot and decides what kind of rule the line describes.

use super::WarningKind;
use regex::Regex;
use std::sync::LazyLock;

static RE_COMMENT_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*::\S+(?:\s+\S+)?)(.*)$").unwrap());
static RE_COMMENT_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*?)\s+#").unwrap());
static RE_ANY_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)::([a-z]\S*)").unwrap());
static RE_GLUED_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+::[a-z]\S*").unwrap());
static RE_EMOJI_SHORTCUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^:[a-z][-_a-z]*[a-z]:$").unwrap());
static RE_SYMBOL_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:symbol|emoji)\b").unwrap());
static RE_SYNTAX_CHECKED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"::syntax-checked True\b").unwrap());
static RE_LIST_SEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";\s*").unwrap());

/// Remove a trailing `# comment`; a line starting with `#` becomes empty
///
/// A `#` only opens a comment after the value of the last slot, so values
/// such as `::punct-split #` survive.
pub fn strip_comment(line: &str) -> &str {
    if !line.contains('#') {
        return line;
    }
    if line.starts_with('#') {
        return "";
    }
    if let Some(head) = RE_COMMENT_HEAD.captures(line) {
        let kept = head.get(1).map_or(0, |m| m.end());
        let rest = &line[kept..];
        if let Some(tail) = RE_COMMENT_TAIL.captures(rest) {
            let cut = kept + tail.get(1).map_or(0, |m| m.end());
            return &line[..cut];
        }
    }
    line
}

/// True for lines that carry no rule (blank, comment, lone byte-order mark)
pub fn is_blank(line: &str) -> bool {
    let line = line.trim_start_matches('\u{FEFF}').trim();
    line.is_empty() || line.starts_with('#')
}

/// Split a `;`-separated slot value
pub fn split_list(value: &str) -> Vec<String> {
    RE_LIST_SEP
        .split(value)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a language-code list such as `eng;deu` or `eng, deu`
pub fn split_lang_codes(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ';' || c == ',' || c == '*' || c.is_whitespace())
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// A rule line parsed into its slots
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotLine {
    slots: Vec<(String, String)>,
}

impl SlotLine {
    /// Parse `line`; text before the first slot marker is ignored
    pub fn parse(line: &str) -> Self {
        let mut markers = Vec::new();
        let mut prev: Option<char> = None;
        for (i, c) in line.char_indices() {
            if c == ':'
                && prev.map_or(true, char::is_whitespace)
                && line[i..].starts_with("::")
                && line[i + 2..].chars().next().is_some_and(|c| !c.is_whitespace())
            {
                markers.push(i);
            }
            prev = Some(c);
        }

        let mut slots = Vec::with_capacity(markers.len());
        for (k, &start) in markers.iter().enumerate() {
            let end = markers.get(k + 1).copied().unwrap_or(line.len());
            let body = &line[start + 2..end];
            let name_len = body.find(char::is_whitespace).unwrap_or(body.len());
            let name = &body[..name_len];
            let value = body[name_len..].trim();
            slots.push((name.to_string(), value.to_string()));
        }
        Self { slots }
    }

    pub fn head(&self) -> Option<(&str, &str)> {
        self.slots
            .first()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn head_slot(&self) -> Option<&str> {
        self.head().map(|(name, _)| name)
    }

    pub fn head_value(&self) -> Option<&str> {
        self.head().map(|(_, value)| value)
    }

    /// Value of `slot`; the last occurrence wins
    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots
            .iter()
            .rev()
            .find(|(name, _)| name == slot)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `slot` if present and non-empty
    pub fn value(&self, slot: &str) -> Option<&str> {
        self.get(slot).filter(|value| !value.is_empty())
    }

    pub fn has(&self, slot: &str) -> bool {
        self.value(slot).is_some()
    }

    /// Boolean slot: present, non-empty and not `False`
    pub fn flag(&self, slot: &str) -> bool {
        self.value(slot)
            .is_some_and(|value| !value.eq_ignore_ascii_case("false"))
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    pub fn with_head_value(&self, value: &str) -> Self {
        let mut line = self.clone();
        if let Some(head) = line.slots.first_mut() {
            head.1 = value.to_string();
        }
        line
    }

    pub fn with_value(&self, slot: &str, value: &str) -> Self {
        let mut line = self.clone();
        for (name, old) in line.slots.iter_mut() {
            if name == slot {
                *old = value.to_string();
            }
        }
        line
    }

    pub fn without(&self, slots: &[&str]) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .filter(|(name, _)| !slots.contains(&name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// A new line with `head` and `target` in front of the remaining slots of `self`
    pub fn rehead(&self, head: &str, head_value: &str, target: &str) -> Self {
        let mut slots = vec![
            (head.to_string(), head_value.to_string()),
            ("target".to_string(), target.to_string()),
        ];
        slots.extend(self.slots.iter().skip(1).filter(|(name, _)| name != "target").cloned());
        Self { slots }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.slots {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str("::");
            out.push_str(name);
            if !value.is_empty() {
                out.push(' ');
                out.push_str(value);
            }
        }
        out
    }
}

/// Slots a rule file may use and the slots each head requires
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub valid_slots: &'static [&'static str],
    pub required: &'static [(&'static str, &'static [&'static str])],
}

const TOK_SLOTS: &[&str] = &[
    "abbrev",
    "alt-spelling",
    "case-sensitive",
    "char-split",
    "comment",
    "contraction",
    "country",
    "eng",
    "etym-lcode",
    "example",
    "exp",
    "group",
    "inflections",
    "last-char-repeatable",
    "lcode",
    "lcode-not",
    "left-context",
    "left-context-not",
    "lexical",
    "misspelling",
    "non-symbol",
    "nonstandard",
    "plural",
    "problem",
    "priority",
    "punct-split",
    "repair",
    "right-context",
    "right-context-not",
    "sem-class",
    "side",
    "substandard",
    "suffix-variations",
    "syntax-checked",
    "tag",
    "target",
    "taxon",
    "token-category",
];

const DETOK_SLOTS: &[&str] = &[
    "alt-spelling",
    "attach-tag",
    "auto-attach",
    "case-sensitive",
    "char-split",
    "comment",
    "contraction",
    "country",
    "eng",
    "etym-lcode",
    "example",
    "except",
    "exp",
    "group",
    "inflections",
    "last-char-repeatable",
    "lcode",
    "lcode-not",
    "left-context",
    "left-context-not",
    "lexical",
    "markup-attach",
    "misspelling",
    "non-symbol",
    "nonstandard",
    "paired-delimiter",
    "plural",
    "priority",
    "problem",
    "right-context",
    "right-context-not",
    "sem-class",
    "side",
    "substandard",
    "suffix-variations",
    "syntax-checked",
    "tag",
    "target",
    "taxon",
    "token-category",
];

pub const TOK_SCHEMA: Schema = Schema {
    valid_slots: TOK_SLOTS,
    required: &[
        ("abbrev", &[]),
        ("contraction", &["target"]),
        ("lexical", &[]),
        ("misspelling", &["target"]),
        ("non-symbol", &[]),
        ("punct-split", &["side"]),
        ("repair", &["target"]),
    ],
};

pub const DETOK_SCHEMA: Schema = Schema {
    valid_slots: DETOK_SLOTS,
    required: &[
        ("attach-tag", &[]),
        ("auto-attach", &["side"]),
        ("contraction", &["target"]),
        ("lexical", &[]),
        ("markup-attach", &[]),
        ("non-symbol", &[]),
    ],
};

pub const TLD_SCHEMA: Schema = Schema {
    valid_slots: &["code", "comment", "country-name", "example", "reliability"],
    required: &[("code", &[])],
};

impl Schema {
    fn required_for(&self, head: &str) -> Option<&'static [&'static str]> {
        self.required
            .iter()
            .find(|(name, _)| *name == head)
            .map(|(_, required)| *required)
    }

    /// Problems found in `line`; an empty result means the line is well-formed
    pub fn validate(&self, line: &str) -> Vec<WarningKind> {
        let mut problems = Vec::new();
        let slots: Vec<&str> = RE_ANY_SLOT
            .captures_iter(line)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        let Some(head) = slots.first() else {
            problems.push(WarningKind::NoSlots);
            return problems;
        };
        let required = self.required_for(head).unwrap_or_else(|| {
            problems.push(WarningKind::InvalidHead(head.to_string()));
            &[]
        });

        let mut seen: Vec<&str> = Vec::new();
        for slot in &slots {
            if !self.valid_slots.contains(slot) {
                problems.push(WarningKind::UnexpectedSlot(slot.to_string()));
            } else if seen.contains(slot) {
                problems.push(WarningKind::DuplicateSlot(slot.to_string()));
            } else {
                seen.push(slot);
            }
        }
        for slot in required {
            if !seen.contains(slot) {
                problems.push(WarningKind::MissingRequiredSlot(slot.to_string()));
            }
        }

        if let Some(glued) = RE_GLUED_SLOT.find(line) {
            let glued = glued.as_str().to_string();
            if glued.contains(":::") {
                problems.push(WarningKind::SpuriousColon(glued));
            } else {
                problems.push(WarningKind::MissingSpace(glued));
            }
        }

        let single_colon = line
            .split_whitespace()
            .rfind(|token| {
                let mut chars = token.chars();
                chars.next() == Some(':') && chars.next().is_some_and(|c| c.is_ascii_lowercase())
            });
        if let Some(token) = single_colon {
            let emoji_shortcut = RE_EMOJI_SHORTCUT.is_match(token) && RE_SYMBOL_WORD.is_match(line);
            if !emoji_shortcut && !RE_SYNTAX_CHECKED.is_match(line) {
                problems.push(WarningKind::MissingColon(token.to_string()));
            }
        }
        problems
    }
}
