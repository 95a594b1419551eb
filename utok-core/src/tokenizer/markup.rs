//! Attach-tag markup for punctuation that the detokenizer must reattach
//!
//! A hyphen inside `well-known` becomes `@-@`, a slash after a word `@/`.
//! Non-directional paired delimiters such as `"` get the tag on the side
//! facing the text they enclose.

use super::context::{orientation, Orientation};
use crate::resource::{lowercase, DetokRules, MarkupRule};

/// Decorate `token` with the attach tag according to the markup-attach rules
///
/// `left` and `right` are the full-line contexts of the token.
pub(crate) fn decorate(detok: &DetokRules, token: &str, left: &str, right: &str, lang: Option<&str>) -> String {
    if !detok.is_markup_token(token) {
        return token.to_string();
    }
    let lc = lowercase(token);
    let key = rule_key(detok, &lc);
    let group_required = lc != key;

    let mut valid: Option<&MarkupRule> = None;
    let mut paired = false;
    for rule in detok.markup_rules(key) {
        if rule.rule.admits(&lc, left, right, lang, group_required) {
            valid = Some(rule);
            if rule.paired_delimiter {
                paired = true;
                break;
            }
        }
    }
    let Some(rule) = valid else {
        return token.to_string();
    };

    let tag = detok.attach_tag();
    let mut decorated = token.to_string();
    let oriented = if paired { orientation(left, right) } else { None };
    match oriented {
        Some(Orientation::Open) => decorated.push(tag),
        Some(Orientation::Close) => decorated.insert(0, tag),
        None => {
            if left.ends_with(|c: char| !c.is_whitespace()) {
                decorated.insert(0, tag);
            }
            if right.starts_with(|c: char| !c.is_whitespace()) {
                decorated.push(tag);
            }
        }
    }
    if rule.exceptions.contains(&decorated) {
        token.to_string()
    } else {
        decorated
    }
}

/// Lookup key of `lc`: runs of one repeated character shrink to the longest prefix with rules
fn rule_key<'a>(detok: &DetokRules, lc: &'a str) -> &'a str {
    let mut chars = lc.chars();
    let Some(first) = chars.next() else {
        return lc;
    };
    if !chars.all(|c| c == first) {
        return lc;
    }
    let mut key = lc;
    while key.chars().count() >= 2 && !detok.has_markup_rules(key) {
        let cut = key.char_indices().next_back().map_or(0, |(i, _)| i);
        key = &key[..cut];
    }
    key
}
