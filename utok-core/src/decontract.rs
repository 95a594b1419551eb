//! Contraction and repair mapping
//!
//! Splits one surface token into the tokens of a rule target, for example
//! `Won't` into `Will n't`, keeping track of which part of the surface each
//! output token came from.

use crate::charclass::is_letter;
use std::ops::Range;

/// One output token of a contraction mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Target token with capitalization adjusted to the surface
    pub surface: String,
    /// Part of the input token it stands for
    pub original: String,
    /// Byte range of `original` within the input token
    pub range: Range<usize>,
}

fn letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().filter(|&c| is_letter(c))
}

/// Adjust the capitalization of `s` to the one of `original`
///
/// `will` against `Wo` gives `Will`; against `WO` gives `WILL`. Strings
/// whose letters already agree, and originals without a leading capital,
/// leave `s` unchanged.
pub fn adjust_capitalization(s: &str, original: &str) -> String {
    if s == original || letters(s).eq(letters(original)) {
        return s.to_string();
    }
    let mut original_letters = letters(original);
    match (original_letters.next(), original_letters.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => s.to_uppercase(),
        (Some(first), _) if first.is_uppercase() => capitalize(s),
        _ => s.to_string(),
    }
}

/// Uppercase the first letter and lowercase everything after it
fn capitalize(s: &str) -> String {
    let Some(pos) = s.find(is_letter) else {
        return s.to_lowercase();
    };
    let mut rest = s[pos..].chars();
    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..pos]);
    if let Some(first) = rest.next() {
        out.extend(first.to_uppercase());
    }
    out.push_str(&rest.as_str().to_lowercase());
    out
}

struct Mapper<'a> {
    token: &'a str,
    /// Byte offset of every char of `token`, plus its length
    bounds: Vec<usize>,
}

impl<'a> Mapper<'a> {
    fn new(token: &'a str) -> Self {
        let mut bounds: Vec<usize> = token.char_indices().map(|(i, _)| i).collect();
        bounds.push(token.len());
        Self { token, bounds }
    }

    fn piece(&self, target: &str, chars: Range<usize>) -> Piece {
        let range = self.bounds[chars.start]..self.bounds[chars.end];
        let original = &self.token[range.clone()];
        Piece {
            surface: adjust_capitalization(target, original),
            original: original.to_string(),
            range,
        }
    }
}

/// Map `token`, matched by a rule with surface `source`, onto the
/// whitespace-separated tokens of `target`
///
/// With `char_splits`, the token is cut into pieces of those character
/// lengths. Otherwise target tokens are peeled off the end or start of the
/// source while they agree with it; whatever remains in the middle becomes
/// one piece. The pieces cover the token without gaps or overlaps, apart
/// from spaces inside the token.
pub fn map_contraction(token: &str, source: &str, target: &str, char_splits: Option<&[usize]>) -> Vec<Piece> {
    let mapper = Mapper::new(token);
    let n_chars = mapper.bounds.len() - 1;

    if let Some(splits) = char_splits {
        let mut pieces = Vec::with_capacity(splits.len());
        let mut start = 0;
        for (&len, target) in splits.iter().zip(target.split_whitespace()) {
            let end = (start + len).min(n_chars);
            pieces.push(mapper.piece(target, start..end));
            start = end;
        }
        return pieces;
    }

    if !source.contains(' ') && !target.contains(' ') {
        return vec![mapper.piece(target, 0..n_chars)];
    }

    let token_chars: Vec<char> = token.chars().collect();
    let mut source: Vec<char> = source.chars().collect();
    let mut target: Vec<char> = target.chars().collect();
    let (mut lo, mut hi) = (0, n_chars);
    let mut front = Vec::new();
    let mut back = Vec::new();

    while lo < hi {
        let target_s: String = target.iter().collect();
        let elements: Vec<Vec<char>> = target_s
            .split_whitespace()
            .map(|element| element.chars().collect())
            .collect();
        let (Some(first), Some(last)) = (elements.first(), elements.last()) else {
            break;
        };

        if last.len() <= hi - lo && source.ends_with(last) {
            let len = last.len();
            let element: String = last.iter().collect();
            back.push(mapper.piece(&element, hi - len..hi));
            hi -= len;
            source.truncate(source.len().saturating_sub(len));
            target.truncate(target.len() - len);
            while target.last().is_some_and(|c| c.is_whitespace()) {
                target.pop();
            }
            while hi > lo && token_chars[hi - 1] == ' ' {
                hi -= 1;
            }
        } else if first.len() <= hi - lo && source.starts_with(first) {
            let len = first.len();
            let element: String = first.iter().collect();
            front.push(mapper.piece(&element, lo..lo + len));
            lo += len;
            source.drain(..len.min(source.len()));
            target.drain(..len);
            while target.first().is_some_and(|c| c.is_whitespace()) {
                target.remove(0);
            }
            while lo < hi && token_chars[lo] == ' ' {
                lo += 1;
            }
        } else {
            let rest: String = target.iter().collect();
            front.push(mapper.piece(&rest, lo..hi));
            break;
        }
    }

    back.reverse();
    front.extend(back);
    front
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(pieces: &[Piece]) -> Vec<&str> {
        pieces.iter().map(|p| p.surface.as_str()).collect()
    }

    #[test]
    fn test_adjust_capitalization() {
        assert_eq!(adjust_capitalization("will", "Wo"), "Will");
        assert_eq!(adjust_capitalization("will", "WO"), "WILL");
        assert_eq!(adjust_capitalization("will", "wo"), "will");
        assert_eq!(adjust_capitalization("n't", "N'T"), "n't");
        assert_eq!(adjust_capitalization("'s", "'S"), "'s");
        assert_eq!(adjust_capitalization("don't", "Do"), "Don't");
        assert_eq!(adjust_capitalization("jusqu'au", "Jusque"), "Jusqu'au");
        assert_eq!(adjust_capitalization("'em", "'Em"), "'em");
    }

    #[test]
    fn test_char_splits() {
        let pieces = map_contraction("Won't", "won't", "will n't", Some(&[2, 3]));
        assert_eq!(surfaces(&pieces), vec!["Will", "n't"]);
        assert_eq!(pieces[0].original, "Wo");
        assert_eq!(pieces[0].range, 0..2);
        assert_eq!(pieces[1].range, 2..5);
    }

    #[test]
    fn test_greedy_suffix_then_rest() {
        let pieces = map_contraction("Won't", "won't", "will n't", None);
        assert_eq!(surfaces(&pieces), vec!["Will", "n't"]);
        assert_eq!(pieces[1].original, "n't");
    }

    #[test]
    fn test_greedy_prefix() {
        let pieces = map_contraction("Cannot", "cannot", "can not", None);
        assert_eq!(surfaces(&pieces), vec!["Can", "not"]);
        assert_eq!(pieces[0].range, 0..3);
        assert_eq!(pieces[1].range, 3..6);
    }

    #[test]
    fn test_single_token_repair() {
        let pieces = map_contraction("Recieve", "recieve", "receive", None);
        assert_eq!(surfaces(&pieces), vec!["Receive"]);
        assert_eq!(pieces[0].range, 0..7);
    }

    #[test]
    fn test_spaced_source() {
        let pieces = map_contraction("e. g.", "e. g.", "e.g.", None);
        assert_eq!(surfaces(&pieces), vec!["e.g."]);
        assert_eq!(pieces[0].original, "e. g.");
    }

    #[test]
    fn test_three_way_split() {
        let pieces = map_contraction("du", "du", "de le", None);
        assert_eq!(surfaces(&pieces), vec!["de le"]);
        let pieces = map_contraction("Jusqu'au", "jusqu'au", "jusque à le", None);
        assert_eq!(surfaces(&pieces), vec!["Jusque à le"]);
        assert_eq!(pieces[0].range, 0..8);
    }

    #[test]
    fn test_multibyte_ranges() {
        let pieces = map_contraction("Don’t", "don’t", "do n’t", None);
        assert_eq!(surfaces(&pieces), vec!["Do", "n’t"]);
        assert_eq!(pieces[1].range, 2.."Don’t".len());
    }
}
