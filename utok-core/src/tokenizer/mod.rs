//! Line tokenizer
//!
//! A [`Tokenizer`] loads its rule resources once and is then read-only, so
//! one instance can tokenize lines from several threads.
//!
//! # Example
//!
//! ```rust
//! use utok_core::{Tokenizer, TokenizerConfig};
//!
//! let config = TokenizerConfig::builder().languages("eng").build().unwrap();
//! let tokenizer = Tokenizer::new(config).unwrap();
//! assert_eq!(tokenizer.tokenize("Dont worry!"), "Dont worry !");
//! ```

mod context;
mod markup;
mod normalize;
mod patterns;
mod stages;

use crate::charclass::Classifier;
use crate::chart::Chart;
use crate::config::TokenizerConfig;
use crate::error::Result;
use crate::resource::{DetokRules, LoadReport, ResourceLoader, RuleStore, TopLevelDomains};
use patterns::Patterns;
use stages::{Pass, PassState, Stage};
use std::sync::LazyLock;

static RE_LINE_ID: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^(\S+)(\s+)(\S|\S.*\S)\s*$").unwrap());

/// Result of tokenizing one line
#[derive(Debug, Clone)]
pub struct TokenizedLine {
    /// Space-separated tokens, prefixed by the echoed line id if there is one
    pub text: String,
    /// Token chart, if charts are enabled
    pub chart: Option<Chart>,
}

/// Rule-driven tokenizer
pub struct Tokenizer {
    config: TokenizerConfig,
    store: RuleStore,
    detok: DetokRules,
    tlds: TopLevelDomains,
    patterns: Patterns,
    classifier: Classifier,
    reports: Vec<LoadReport>,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("config", &self.config)
            .field("rules", &self.store.len())
            .field("attach_tag", &self.classifier.attach_tag())
            .finish_non_exhaustive()
    }
}

impl Tokenizer {
    /// Load the rule resources selected by `config`
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        config.validate()?;
        let source = config.resource_source();
        let mut store = RuleStore::new();
        let mut detok = DetokRules::new();
        let mut tlds = TopLevelDomains::new();

        let mut loader = ResourceLoader::new(&source);
        for lang in &config.languages {
            loader.load_language(lang, |text, name| store.load_str(text, name))?;
        }
        if !config.languages.iter().any(|lang| lang == "eng-global") {
            loader.load("tok-resource-eng-global.txt", |text, name| store.load_str(text, name))?;
        }
        loader.load("tok-resource.txt", |text, name| store.load_str(text, name))?;
        loader.load("detok-resource.txt", |text, name| {
            detok.load_str(text, name, &config.languages)
        })?;
        let mut reports = loader.finish()?;

        let mut loader = ResourceLoader::new(&source);
        if loader.load("top-level-domain-codes.txt", |text, name| tlds.load_str(text, name))? {
            reports.extend(loader.finish()?);
        } else {
            log::warn!("No top-level domain list found; domain names without a scheme will not be recognized");
        }

        if let Some(tag) = config.attach_tag {
            detok.set_attach_tag(tag);
        }
        let classifier = Classifier::new(detok.attach_tag());
        let patterns = Patterns::build(&store, &tlds, &config.languages);

        Ok(Self {
            config,
            store,
            detok,
            tlds,
            patterns,
            classifier,
            reports,
        })
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Reports of all loaded resource files
    pub fn load_reports(&self) -> &[LoadReport] {
        &self.reports
    }

    pub fn attach_tag(&self) -> char {
        self.classifier.attach_tag()
    }

    /// Whether scheme-less domain names are recognized
    pub fn knows_top_level_domains(&self) -> bool {
        !self.tlds.is_empty()
    }

    /// Tokenize one line of text
    pub fn tokenize(&self, line: &str) -> String {
        self.tokenize_line(line, "1").text
    }

    /// Tokenize one line, building a chart under `line_id` if charts are enabled
    pub fn tokenize_line(&self, line: &str, line_id: &str) -> TokenizedLine {
        let (normalized, map) = normalize::normalize(line, self.classifier.line_vector(line));
        let chart = self
            .config
            .chart
            .then(|| Chart::new(line_id, line, normalized.as_str(), map));

        let pass = Pass {
            tok: self,
            line: &normalized,
            lv: self.classifier.line_vector(&normalized),
            lang: self.config.primary_language(),
            line_id,
        };
        let mut state = PassState::new(chart);
        pass.run(&mut state, Stage::FIRST, 0..normalized.len());

        let text = state
            .tokens
            .iter()
            .filter(|token| !token.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        let chart = state.chart.map(|mut chart| {
            chart.sort_tokens();
            log::debug!("{chart}");
            chart
        });
        TokenizedLine { text, chart }
    }

    /// Tokenize input line number `line_number` (1-based)
    ///
    /// With `first_token_is_line_id`, the first token and the whitespace
    /// after it are echoed and only the rest is tokenized. Otherwise the
    /// line number serves as the chart's line id.
    pub fn process_line(&self, line: &str, line_number: usize) -> TokenizedLine {
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        if self.config.first_token_is_line_id {
            if let Some(caps) = RE_LINE_ID.captures(line) {
                let (id, sep, rest) = (&caps[1], &caps[2], &caps[3]);
                let tokenized = self.tokenize_line(rest, id);
                return TokenizedLine {
                    text: format!("{id}{sep}{}", tokenized.text),
                    chart: tokenized.chart,
                };
            }
        }
        self.tokenize_line(line, &line_number.to_string())
    }

    /// Tokenize a batch of lines numbered from `first_line_number`, in order
    #[cfg(feature = "parallel")]
    pub fn process_lines(&self, lines: &[String], first_line_number: usize) -> Vec<TokenizedLine> {
        use rayon::prelude::*;
        lines
            .par_iter()
            .enumerate()
            .map(|(i, line)| self.process_line(line, first_line_number + i))
            .collect()
    }

    /// Tokenize a batch of lines numbered from `first_line_number`, in order
    #[cfg(not(feature = "parallel"))]
    pub fn process_lines(&self, lines: &[String], first_line_number: usize) -> Vec<TokenizedLine> {
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| self.process_line(line, first_line_number + i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::TokenType;

    fn tokenizer() -> Tokenizer {
        let config = TokenizerConfig::builder().languages("eng").build().unwrap();
        Tokenizer::new(config).unwrap()
    }

    fn chart_tokenizer() -> Tokenizer {
        let config = TokenizerConfig::builder()
            .languages("eng")
            .chart(true)
            .build()
            .unwrap();
        Tokenizer::new(config).unwrap()
    }

    #[test]
    fn test_sentence_with_price_and_domain() {
        let tok = tokenizer();
        assert_eq!(
            tok.tokenize("Sold,for $9,999.99 on ebay.com."),
            "Sold , for $ 9,999.99 on ebay.com ."
        );
    }

    #[test]
    fn test_unknown_misspelling_left_alone() {
        assert_eq!(tokenizer().tokenize("Dont worry!"), "Dont worry !");
    }

    #[test]
    fn test_contractions() {
        let tok = tokenizer();
        assert_eq!(tok.tokenize("Won't he?"), "Will n't he ?");
        assert_eq!(tok.tokenize("I don't know."), "I do n't know .");
        assert_eq!(tok.tokenize("John's car"), "John 's car");
    }

    #[test]
    fn test_longest_abbreviation_wins() {
        let tok = chart_tokenizer();
        let line = tok.tokenize_line("The U.S.A. team", "1");
        assert_eq!(line.text, "The U.S.A. team");
        let chart = line.chart.unwrap();
        let abbrev = chart
            .tokens()
            .iter()
            .find(|token| token.kind == TokenType::Abbrev)
            .unwrap();
        assert_eq!(abbrev.surface, "U.S.A.");
        assert_eq!(abbrev.sem_class.as_deref(), Some("country"));
    }

    #[test]
    fn test_infix_hyphen_markup() {
        let tok = tokenizer();
        assert_eq!(tok.tokenize("a well-known fact"), "a well @-@ known fact");

        let config = TokenizerConfig::builder()
            .languages("eng")
            .simple(true)
            .build()
            .unwrap();
        let simple = Tokenizer::new(config).unwrap();
        assert_eq!(simple.tokenize("a well-known fact"), "a well - known fact");
    }

    #[test]
    fn test_protected_spans() {
        let tok = tokenizer();
        assert_eq!(
            tok.tokenize("Mail me@example.com or see https://example.org/a?b=1."),
            "Mail me@example.com or see https://example.org/a?b=1 ."
        );
        assert_eq!(tok.tokenize("<b>bold</b>"), "<b> bold </b>");
        assert_eq!(tok.tokenize("Follow #rustlang now"), "Follow #rustlang now");
    }

    #[test]
    fn test_chart_spans_refer_to_original() {
        let tok = chart_tokenizer();
        // the soft hyphen is removed before segmentation
        let line = tok.tokenize_line("ab\u{AD}c d.", "7");
        assert_eq!(line.text, "abc d .");
        let chart = line.chart.unwrap();
        assert_eq!(chart.line_id(), "7");
        let spans: Vec<String> = chart.tokens().iter().map(|t| t.span.to_string()).collect();
        assert_eq!(spans, vec!["0-4", "5-6", "6-7"]);
    }

    #[test]
    fn test_line_id_echoed() {
        let config = TokenizerConfig::builder()
            .languages("eng")
            .first_token_is_line_id(true)
            .build()
            .unwrap();
        let tok = Tokenizer::new(config).unwrap();
        assert_eq!(tok.process_line("s1\tHello, world.\n", 1).text, "s1\tHello , world .");
        // nothing to split off: the whole line is tokenized
        assert_eq!(tok.process_line("Hello,\n", 2).text, "Hello ,");
    }

    #[test]
    fn test_process_lines_keeps_order() {
        let tok = tokenizer();
        let lines: Vec<String> = (0..50).map(|i| format!("Line {i}, done.")).collect();
        let out = tok.process_lines(&lines, 1);
        assert_eq!(out.len(), 50);
        assert_eq!(out[17].text, "Line 17 , done .");
    }

    #[test]
    fn test_empty_and_blank_lines() {
        let tok = tokenizer();
        assert_eq!(tok.tokenize(""), "");
        assert_eq!(tok.tokenize("   \t "), "");
    }
}
