//! Token chart: every token produced for a line, with spans and types
//!
//! Stages register tokens against byte offsets of the normalized line; the
//! chart converts those into character offsets of the original line.

use crate::remap::OffsetMap;
use crate::span::{ComplexSpan, SimpleSpan};
use serde::Serialize;
use std::fmt;

/// Token category recorded in annotations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenType {
    Xml,
    BbCode,
    Url,
    UrlLexical,
    EmailAddress,
    Filename,
    Symbol,
    Hashtag,
    Handle,
    AbbrevPattern,
    AbbrevPhonetic,
    Abbrev,
    AbbrevInitial,
    AbbrevPeriods,
    Decontraction,
    Repair,
    Number,
    NumberEthiopic,
    NumberPrefix,
    Lexical,
    LexicalPriority,
    LexicalName,
    PunctMarkup,
    Dash,
    Punct,
    PunctStart,
    PunctEnd,
    WordBasic,
    NumberBasic,
    SymbolBasic,
    PunctBasic,
    MiscBasic,
    /// Type named by a resource entry's `::tag`
    Tag(String),
}

impl TokenType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Xml => "XML",
            Self::BbCode => "BBCode",
            Self::Url => "URL",
            Self::UrlLexical => "URL-L",
            Self::EmailAddress => "EMAIL-ADDRESS",
            Self::Filename => "FILENAME",
            Self::Symbol => "SYMBOL",
            Self::Hashtag => "HASHTAG",
            Self::Handle => "HANDLE",
            Self::AbbrevPattern => "ABBREV-P",
            Self::AbbrevPhonetic => "ABBREV-IP",
            Self::Abbrev => "ABBREV",
            Self::AbbrevInitial => "ABBREV-I",
            Self::AbbrevPeriods => "ABBREV-PP",
            Self::Decontraction => "DECONTRACTION",
            Self::Repair => "REPAIR",
            Self::Number => "NUMBER",
            Self::NumberEthiopic => "NUMBER-E",
            Self::NumberPrefix => "NUMBER-2",
            Self::Lexical => "LEXICAL",
            Self::LexicalPriority => "LEXICAL-P",
            Self::LexicalName => "LEXICAL-N",
            Self::PunctMarkup => "PUNCT-MT",
            Self::Dash => "DASH",
            Self::Punct => "PUNCT",
            Self::PunctStart => "PUNCT-S",
            Self::PunctEnd => "PUNCT-E",
            Self::WordBasic => "WORD-B",
            Self::NumberBasic => "NUMBER-B",
            Self::SymbolBasic => "SYMBOL-B",
            Self::PunctBasic => "PUNCT-B",
            Self::MiscBasic => "MISC-B",
            Self::Tag(tag) => tag,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface as emitted, possibly decontracted or decorated
    pub surface: String,
    /// Text covered in the normalized line
    pub original_surface: String,
    pub kind: TokenType,
    pub sem_class: Option<String>,
    pub span: ComplexSpan,
}

/// All tokens of one line
#[derive(Debug, Clone)]
pub struct Chart {
    line_id: String,
    original: String,
    current: String,
    map: OffsetMap,
    /// Byte offset of every character of `current`
    char_starts: Vec<usize>,
    tokens: Vec<Token>,
}

impl Chart {
    /// Chart over `current`, the normalized form of `original`
    pub fn new(
        line_id: impl Into<String>,
        original: impl Into<String>,
        current: impl Into<String>,
        map: OffsetMap,
    ) -> Self {
        let current = current.into();
        let char_starts = current.char_indices().map(|(i, _)| i).collect();
        Self {
            line_id: line_id.into(),
            original: original.into(),
            current,
            map,
            char_starts,
            tokens: Vec::new(),
        }
    }

    pub fn line_id(&self) -> &str {
        &self.line_id
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn char_index(&self, byte: usize) -> usize {
        match self.char_starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i,
        }
    }

    /// Span in the original line for bytes `from..to` of the normalized line
    pub fn span(&self, from: usize, to: usize) -> SimpleSpan {
        let (from, to) = (self.char_index(from), self.char_index(to));
        SimpleSpan::new(self.map.start(from), self.map.end(to))
    }

    pub fn register(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Order tokens by position in the line
    pub fn sort_tokens(&mut self) {
        self.tokens.sort_by_key(|token| token.span.sort_key());
    }

    /// Serializable view of the chart
    pub fn annotation(&self) -> SentenceAnnotation {
        SentenceAnnotation {
            id: self.line_id.clone(),
            snt: self.original.clone(),
            chart: self
                .tokens
                .iter()
                .map(|token| AnnotationEntry {
                    span: token.span.to_string(),
                    kind: token.kind.to_string(),
                    sem_class: token.sem_class.clone(),
                    surf: token.surface.clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chart {}:", self.line_id)?;
        for token in &self.tokens {
            write!(f, " {}:{} {}", token.span, token.kind, token.surface)?;
            if let Some(sem_class) = &token.sem_class {
                write!(f, " ({sem_class})")?;
            }
        }
        Ok(())
    }
}

/// Token annotation of one sentence, as written by annotation serializers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentenceAnnotation {
    #[serde(rename = "ID")]
    pub id: String,
    pub snt: String,
    pub chart: Vec<AnnotationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationEntry {
    pub span: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "sem-class", skip_serializing_if = "Option::is_none")]
    pub sem_class: Option<String>,
    pub surf: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(surface: &str, kind: TokenType, span: SimpleSpan) -> Token {
        Token {
            surface: surface.into(),
            original_surface: surface.into(),
            kind,
            sem_class: None,
            span: span.into(),
        }
    }

    #[test]
    fn test_span_through_deletion() {
        // original "a\u{AD}bc", normalized "abc"
        let mut map = OffsetMap::new(4);
        map.delete_many(&[false, true, false, false]);
        let chart = Chart::new("1", "a\u{AD}bc", "abc", map);
        assert_eq!(chart.span(1, 3), SimpleSpan::new(2, 4));
        // the deleted soft hyphen is absorbed by "a"
        assert_eq!(chart.span(0, 1), SimpleSpan::new(0, 2));
    }

    #[test]
    fn test_span_multibyte() {
        let chart = Chart::new("1", "über x", "über x", OffsetMap::new(6));
        // "x" starts at byte 6, char 5
        assert_eq!(chart.span(6, 7), SimpleSpan::new(5, 6));
    }

    #[test]
    fn test_sorted_annotation() {
        let mut chart = Chart::new("7", "Hi !", "Hi !", OffsetMap::new(4));
        chart.register(token("!", TokenType::PunctEnd, SimpleSpan::new(3, 4)));
        chart.register(Token {
            sem_class: Some("greeting".into()),
            ..token("Hi", TokenType::WordBasic, SimpleSpan::new(0, 2))
        });
        chart.sort_tokens();
        let annotation = chart.annotation();
        assert_eq!(annotation.id, "7");
        assert_eq!(annotation.chart[0].surf, "Hi");
        assert_eq!(annotation.chart[0].sem_class.as_deref(), Some("greeting"));
        assert_eq!(annotation.chart[1].span, "3-4");
        assert_eq!(annotation.chart[1].kind, "PUNCT-E");
        assert_eq!(chart.to_string(), "Chart 7: 0-2:WORD-B Hi (greeting) 3-4:PUNCT-E !");
    }
}
