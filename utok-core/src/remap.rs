//! Offset remapping across character deletions
//!
//! Normalization deletes characters from a line before tokenization. An
//! [`OffsetMap`] remembers, for every position of the current string, which
//! position of the original string it came from, so token spans can always
//! be reported against the original input.

/// Maps current character offsets back to original character offsets
///
/// `starts[i]` is the original offset of the character now at `i`;
/// `ends[i]` is the original offset a span ending at `i` maps to. Deleted
/// characters are absorbed by the character before them, so a replacement
/// that keeps one character and deletes the rest still covers its whole
/// original text. Both vectors stay non-decreasing under deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetMap {
    starts: Vec<usize>,
    ends: Vec<usize>,
    original_len: usize,
}

impl OffsetMap {
    /// Identity map over a string of `len` characters
    pub fn new(len: usize) -> Self {
        Self {
            starts: (0..len).collect(),
            ends: (0..=len).collect(),
            original_len: len,
        }
    }

    /// Current length in characters
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Delete `count` characters at `position`
    ///
    /// Deletions reaching past the end are clamped. Returns the number of
    /// characters actually deleted. Use [`OffsetMap::delete_many`] for
    /// scattered deletions.
    pub fn delete(&mut self, position: usize, count: usize) -> usize {
        let len = self.len();
        if position >= len || count == 0 {
            return 0;
        }
        let count = count.min(len - position);
        self.starts.drain(position..position + count);
        self.ends.drain(position..position + count);
        count
    }

    /// Delete every character whose position is flagged in `doomed`
    ///
    /// One pass over the map, whatever the number of deletions. Flags past
    /// the current length are ignored. Returns the number of characters
    /// deleted.
    pub fn delete_many(&mut self, doomed: &[bool]) -> usize {
        let before = self.len();
        let is_doomed = |i: usize| doomed.get(i).copied().unwrap_or(false);

        let mut i = 0;
        self.starts.retain(|_| {
            i += 1;
            !is_doomed(i - 1)
        });
        // the closing entry at `before` is never doomed
        let mut i = 0;
        self.ends.retain(|_| {
            i += 1;
            i - 1 == before || !is_doomed(i - 1)
        });
        before - self.len()
    }

    /// Original offset of the character at current position `pos`
    pub fn start(&self, pos: usize) -> usize {
        self.starts.get(pos).copied().unwrap_or(self.original_len)
    }

    /// Original offset for a span ending at current position `pos`
    pub fn end(&self, pos: usize) -> usize {
        self.ends.get(pos).copied().unwrap_or(self.original_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity() {
        let map = OffsetMap::new(5);
        assert_eq!(map.len(), 5);
        assert_eq!(map.start(3), 3);
        assert_eq!(map.end(5), 5);
    }

    fn flags(len: usize, doomed: &[usize]) -> Vec<bool> {
        let mut flags = vec![false; len];
        doomed.iter().for_each(|&i| flags[i] = true);
        flags
    }

    #[test]
    fn test_delete_shifts_tail() {
        // "a\u{AD}bc" -> "abc"
        let mut map = OffsetMap::new(4);
        assert_eq!(map.delete_many(&flags(4, &[1])), 1);
        assert_eq!(map.len(), 3);
        assert_eq!(map.start(0), 0);
        assert_eq!(map.start(1), 2);
        assert_eq!(map.start(2), 3);
        assert_eq!(map.end(1), 2);
        assert_eq!(map.end(0), 0);
        assert_eq!(map.end(3), 4);
    }

    #[test]
    fn test_replacement_run_covers_original() {
        // "&nbsp;x" collapsed to "\u{A0}x": keep one char, delete five
        let mut map = OffsetMap::new(7);
        map.delete_many(&flags(7, &[1, 2, 3, 4, 5]));
        assert_eq!(map.start(0), 0);
        assert_eq!(map.end(1), 6);
        assert_eq!(map.start(1), 6);
        assert_eq!(map.end(2), 7);
    }

    #[test]
    fn test_scattered_deletions() {
        // "a.b.c.d" without the dots
        let mut map = OffsetMap::new(7);
        assert_eq!(map.delete_many(&flags(7, &[1, 3, 5])), 3);
        assert_eq!((0..4).map(|i| map.start(i)).collect::<Vec<_>>(), [0, 2, 4, 6]);
        assert_eq!((0..=4).map(|i| map.end(i)).collect::<Vec<_>>(), [0, 2, 4, 6, 7]);
    }

    #[test]
    fn test_delete_range_clamped() {
        let mut map = OffsetMap::new(6);
        assert_eq!(map.delete(1, 2), 2);
        assert_eq!(map.start(1), 3);
        assert_eq!(map.end(1), 3);
        assert_eq!(map.delete(3, 10), 1);
        assert_eq!(map.delete(7, 1), 0);
        assert_eq!(map.len(), 3);
        assert_eq!(map.end(3), 6);
    }

    #[test]
    fn test_short_and_long_flag_slices() {
        let mut map = OffsetMap::new(3);
        assert_eq!(map.delete_many(&[false, false]), 0);
        assert_eq!(map.delete_many(&[false, false, true, true, true]), 1);
        assert_eq!(map.len(), 2);
        assert_eq!(map.end(2), 3);
        assert_eq!(map.original_len(), 3);
    }

    #[test]
    fn test_many_deletions_in_one_pass() {
        let n = 200_000;
        let doomed: Vec<bool> = (0..n).map(|i| i % 2 == 1).collect();
        let mut map = OffsetMap::new(n);
        let started = std::time::Instant::now();
        assert_eq!(map.delete_many(&doomed), n / 2);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert_eq!(map.start(n / 2 - 1), n - 2);
        assert_eq!(map.end(n / 2), n);
    }

    proptest! {
        #[test]
        fn prop_monotonic_after_deletions(
            len in 1usize..60,
            rounds in prop::collection::vec(prop::collection::vec(any::<bool>(), 0..60), 0..6)
        ) {
            let mut map = OffsetMap::new(len);
            for doomed in rounds {
                map.delete_many(&doomed);
            }
            for i in 1..map.len() {
                prop_assert!(map.start(i - 1) < map.start(i));
            }
            for i in 1..=map.len() {
                prop_assert!(map.end(i - 1) <= map.end(i));
                prop_assert!(map.end(i) <= len);
            }
            for i in 0..map.len() {
                prop_assert!(map.start(i) < map.end(i + 1));
            }
        }
    }
}
