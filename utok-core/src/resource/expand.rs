//! Rule-line expansion
//!
//! One authored line can stand for many rules: apostrophe and hyphen
//! variants, plurals, inflections, alternative spellings, spaced
//! abbreviations, repeated final characters and misspellings. Derived lines
//! drop the slots that produced them, so expanding them again yields
//! nothing new.

use super::line::{split_list, SlotLine};
use regex::Regex;
use std::sync::LazyLock;

const APOSTROPHE_VARIANTS: [char; 2] = ['’', '‘'];
const HYPHEN_VARIANTS: [char; 2] = ['–', '֊'];
const REPEAT_LIMIT: usize = 127;

/// Slots that drive expansion and are removed from derived lines
const DERIVING_SLOTS: &[&str] = &[
    "plural",
    "inflections",
    "alt-spelling",
    "last-char-repeatable",
    "misspelling",
    "suffix-variations",
];

static RE_ABBREV_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\pL\pM*|\d|[-_])+) ?([.·]) ?((?:\pL|\d).*)$").unwrap()
});
static RE_INNER_PERIOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.·] ?\S").unwrap());
static RE_LEMMA_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:\pL\pM*)+)/(.*)$").unwrap());

/// Spacing variants of an abbreviation: `e.g.` gives `e.g.` and `e. g.`
pub fn abbrev_space_expansions(abbrev: &str) -> Vec<String> {
    let Some(caps) = RE_ABBREV_SPLIT.captures(abbrev) else {
        return vec![abbrev.to_string()];
    };
    let (first, punct, rest) = (&caps[1], &caps[2], &caps[3]);
    let mut expansions = Vec::new();
    for sub in abbrev_space_expansions(rest) {
        expansions.push(format!("{first}{punct}{sub}"));
        if punct == "·" {
            expansions.push(format!("{first} {punct} {sub}"));
        } else {
            expansions.push(format!("{first}{punct} {sub}"));
        }
    }
    expansions
}

fn extend_with(lines: &mut Vec<SlotLine>, derive: impl Fn(&SlotLine) -> Vec<SlotLine>) {
    let derived: Vec<SlotLine> = lines.iter().flat_map(derive).collect();
    lines.extend(derived);
}

fn apostrophe_variants(line: &SlotLine) -> Vec<SlotLine> {
    let Some((head, value)) = line.head() else {
        return Vec::new();
    };
    if head == "punct-split" || !value.contains('\'') {
        return Vec::new();
    }
    APOSTROPHE_VARIANTS
        .iter()
        .map(|variant| {
            let variant = variant.to_string();
            let mut derived = line.with_head_value(&value.replace('\'', &variant));
            if let Some(target) = line.get("target") {
                derived = derived.with_value("target", &target.replace('\'', &variant));
            }
            derived
        })
        .collect()
}

fn hyphen_variants(line: &SlotLine) -> Vec<SlotLine> {
    let Some(value) = line.head_value().filter(|value| value.contains('-')) else {
        return Vec::new();
    };
    HYPHEN_VARIANTS
        .iter()
        .map(|variant| line.with_head_value(&value.replace('-', &variant.to_string())))
        .collect()
}

fn slot_variants(
    line: &SlotLine,
    slot: &str,
    surface: impl Fn(&str, &str) -> String,
) -> Vec<SlotLine> {
    let (Some(head_value), Some(list)) = (line.head_value(), line.value(slot)) else {
        return Vec::new();
    };
    split_list(list)
        .iter()
        .map(|item| {
            line.with_head_value(&surface(head_value, item))
                .without(&[slot])
        })
        .collect()
}

fn plural_variants(line: &SlotLine) -> Vec<SlotLine> {
    slot_variants(line, "plural", |head, plural| {
        if plural == "+s" {
            format!("{head}s")
        } else {
            plural.to_string()
        }
    })
}

fn inflection_variants(line: &SlotLine) -> Vec<SlotLine> {
    slot_variants(line, "inflections", |_, inflection| inflection.to_string())
}

fn alt_spelling_variants(line: &SlotLine) -> Vec<SlotLine> {
    slot_variants(line, "alt-spelling", |head, alt| {
        if alt == "+hyphen" {
            head.replace(' ', "-")
        } else {
            alt.to_string()
        }
    })
}

fn spaced_abbreviation_repairs(line: &SlotLine) -> Vec<SlotLine> {
    let Some((head, value)) = line.head() else {
        return Vec::new();
    };
    if !matches!(head, "abbrev" | "lexical")
        || !RE_INNER_PERIOD.is_match(value)
        || line.get("sem-class") == Some("url")
    {
        return Vec::new();
    }
    let base = line.without(DERIVING_SLOTS);
    abbrev_space_expansions(value)
        .iter()
        .filter(|expansion| expansion.as_str() != value)
        .map(|expansion| base.rehead("repair", expansion, value))
        .collect()
}

fn repeated_last_char_variants(line: &SlotLine) -> Vec<SlotLine> {
    if !line.has("last-char-repeatable") {
        return Vec::new();
    }
    let Some(value) = line.head_value() else {
        return Vec::new();
    };
    let Some(last) = value.chars().last() else {
        return Vec::new();
    };
    let base = line.without(&["last-char-repeatable"]);
    let mut token = value.to_string();
    (0..REPEAT_LIMIT)
        .map(|_| {
            token.push(last);
            base.with_head_value(&token)
        })
        .collect()
}

fn misspelling_repairs(line: &SlotLine) -> Vec<SlotLine> {
    let Some((head, value)) = line.head() else {
        return Vec::new();
    };
    if head == "misspelling" {
        let Some(target) = line.value("target") else {
            return Vec::new();
        };
        let (lemma_suffix, suffix_variations) = match line.value("suffix-variations") {
            Some(raw) => match RE_LEMMA_SUFFIX.captures(raw) {
                Some(caps) => (caps[1].to_string(), split_list(&caps[2])),
                None => (String::new(), split_list(raw)),
            },
            None => (String::new(), Vec::new()),
        };
        let strip = |s: &str| -> String {
            if !lemma_suffix.is_empty() && s.ends_with(&lemma_suffix) {
                s[..s.len() - lemma_suffix.len()].to_string()
            } else {
                s.to_string()
            }
        };
        let (misspelling_stem, target_stem) = (strip(value), strip(target));
        let base = line.without(&["suffix-variations"]);
        let mut repairs = vec![base.rehead("repair", value, target)];
        for suffix in &suffix_variations {
            repairs.push(base.rehead(
                "repair",
                &format!("{misspelling_stem}{suffix}"),
                &format!("{target_stem}{suffix}"),
            ));
        }
        return repairs;
    }

    if !matches!(head, "abbrev" | "lexical") {
        return Vec::new();
    }
    let Some(misspellings) = line.value("misspelling") else {
        return Vec::new();
    };
    let base = line.without(DERIVING_SLOTS);
    split_list(misspellings)
        .iter()
        .map(|misspelling| base.rehead("repair", misspelling, value))
        .collect()
}

/// Expand one comment-free rule line
///
/// The first returned line is `line` itself; derived lines follow in
/// expansion order.
pub fn expand_line(line: &str) -> Vec<String> {
    let mut lines = vec![SlotLine::parse(line)];
    extend_with(&mut lines, apostrophe_variants);
    extend_with(&mut lines, hyphen_variants);
    extend_with(&mut lines, plural_variants);
    extend_with(&mut lines, inflection_variants);
    extend_with(&mut lines, alt_spelling_variants);
    extend_with(&mut lines, spaced_abbreviation_repairs);
    extend_with(&mut lines, repeated_last_char_variants);
    extend_with(&mut lines, misspelling_repairs);

    let mut expanded = Vec::with_capacity(lines.len());
    expanded.push(line.to_string());
    expanded.extend(lines.iter().skip(1).map(SlotLine::render));
    expanded
}
