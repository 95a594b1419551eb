//! Property tests: span coverage, offset monotonicity, expansion idempotence

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use utok_core::remap::OffsetMap;
use utok_core::resource::expand::expand_line;
use utok_core::{Tokenizer, TokenizerConfig};

fn tokenizer() -> &'static Tokenizer {
    static TOKENIZER: OnceLock<Tokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(|| {
        let config = TokenizerConfig::builder()
            .languages("eng")
            .chart(true)
            .build()
            .unwrap();
        Tokenizer::new(config).unwrap()
    })
}

proptest! {
    /// Every non-space character of the line lies in exactly one token span
    #[test]
    fn prop_spans_cover_line(line in "[a-zA-Z0-9éü ,.!?'\"()$%:/@#-]{0,40}") {
        let tokenized = tokenizer().tokenize_line(&line, "p");
        let chart = tokenized.chart.unwrap();
        let chars: Vec<char> = line.chars().collect();
        let mut covered = vec![0usize; chars.len()];

        let mut last_end = 0;
        for token in chart.tokens() {
            for span in token.span.spans() {
                prop_assert!(span.hard_from <= span.hard_to);
                prop_assert!(span.hard_to <= chars.len());
                prop_assert!(span.hard_from >= last_end, "overlap at {} in {:?}", span, line);
                last_end = span.hard_to;
                for count in &mut covered[span.hard_from..span.hard_to] {
                    *count += 1;
                }
            }
        }
        for (c, count) in chars.iter().zip(&covered) {
            if !c.is_whitespace() {
                prop_assert_eq!(*count, 1, "{:?} in {:?}", c, line);
            }
        }
    }

    /// Output tokens never contain leading, trailing or doubled spaces
    #[test]
    fn prop_output_is_trimmed(line in "[a-z ,.'-]{0,30}") {
        let text = tokenizer().tokenize(&line);
        prop_assert_eq!(text.trim(), text.as_str());
        prop_assert!(!text.contains("  "));
    }

    #[test]
    fn prop_offsets_stay_in_bounds(
        len in 1usize..80,
        rounds in prop::collection::vec(prop::collection::vec(any::<bool>(), 0..80), 0..8)
    ) {
        let mut map = OffsetMap::new(len);
        for doomed in rounds {
            map.delete_many(&doomed);
        }
        for i in 0..=map.len() {
            prop_assert!(map.start(i) <= len);
            prop_assert!(map.end(i) <= len);
            if i > 0 {
                prop_assert!(map.start(i - 1) <= map.start(i));
                prop_assert!(map.end(i - 1) <= map.end(i));
            }
        }
    }

    /// Expanding the derived lines of a rule yields no line outside its expansion
    #[test]
    fn prop_expansion_idempotent(
        word in "[a-z]{2,6}",
        slot in prop::sample::select(vec![
            "",
            " ::plural +s",
            " ::alt-spelling +hyphen",
            " ::inflections ed;ing",
            " ::misspelling teh",
        ]),
    ) {
        let source = format!("::lexical {word}'s-{word}{slot}");
        let first: BTreeSet<String> = expand_line(&source).into_iter().collect();
        for derived in &first {
            for again in expand_line(derived) {
                prop_assert!(first.contains(&again), "{} not in expansion of {}", again, source);
            }
        }
    }
}
