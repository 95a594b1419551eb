//! Prefix trie over lowercase rule surfaces
//!
//! Compact trie for forward scanning from a start position. A walk stops as
//! soon as the text leaves every known surface, which bounds the number of
//! candidate lookups per position.

use smallvec::SmallVec;
use std::collections::HashMap;

/// Compact trie node using array indices instead of pointers
#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// Child nodes: char -> node index
    children: HashMap<char, u32>,
    /// Whether a surface ends at this node
    is_end: bool,
}

/// Prefix trie with nodes stored in contiguous memory
#[derive(Debug, Clone)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    len: usize,
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            len: 0,
        }
    }

    /// Number of distinct surfaces
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert an already lowercased surface
    pub fn insert(&mut self, key: &str) {
        let mut current_idx = 0u32;

        for ch in key.chars() {
            let next_idx = match self.nodes[current_idx as usize].children.get(&ch) {
                Some(&child_idx) => child_idx,
                None => {
                    let new_idx = self.nodes.len() as u32;
                    self.nodes.push(TrieNode::default());
                    self.nodes[current_idx as usize].children.insert(ch, new_idx);
                    new_idx
                }
            };
            current_idx = next_idx;
        }

        let node = &mut self.nodes[current_idx as usize];
        if !node.is_end && current_idx != 0 {
            node.is_end = true;
            self.len += 1;
        }
    }

    /// End positions of surfaces starting at `start`, longest first
    pub fn surface_ends(&self, chars: &[char], start: usize) -> SmallVec<[usize; 4]> {
        let mut ends = SmallVec::new();
        let mut current_idx = 0u32;
        for (offset, &ch) in chars.iter().skip(start).enumerate() {
            match self.nodes[current_idx as usize].children.get(&ch) {
                Some(&child_idx) => {
                    current_idx = child_idx;
                    if self.nodes[current_idx as usize].is_end {
                        ends.push(start + offset + 1);
                    }
                }
                None => break,
            }
        }
        ends.reverse();
        ends
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_longest_first() {
        let mut trie = PrefixTrie::new();
        trie.insert("u.");
        trie.insert("u.s.");
        trie.insert("u.s.a.");
        let text = chars("in u.s. today");
        assert_eq!(trie.surface_ends(&text, 3).as_slice(), &[7, 5]);
        assert!(trie.surface_ends(&text, 0).is_empty());
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_duplicate_insert() {
        let mut trie = PrefixTrie::new();
        trie.insert("dr.");
        trie.insert("dr.");
        assert_eq!(trie.len(), 1);
        trie.insert("");
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn test_non_ascii() {
        let mut trie = PrefixTrie::new();
        trie.insert("jusqu'au");
        let text = chars("jusqu'au bout");
        assert_eq!(trie.surface_ends(&text, 0).as_slice(), &[8]);
    }
}
