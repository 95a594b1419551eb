//! Rule-driven multilingual tokenizer and detokenizer
//!
//! This crate splits lines of text into tokens with a cascade of
//! segmentation stages: markup, URLs, e-mail addresses, symbols,
//! abbreviations, contractions, numbers, lexical items and punctuation.
//! What counts as an abbreviation, contraction or splittable punctuation
//! comes from plain-text rule resources, so new languages need data, not
//! code.
//!
//! # Architecture
//!
//! - **Character classes** ([`charclass`]): per-character bit sets; a line's
//!   union lets stages skip lines that cannot match
//! - **Rule resources** ([`resource`]): loading, validation, expansion and
//!   prefix lookup of `::slot value` rule files
//! - **Tokenizer** ([`Tokenizer`]): normalization and the stage cascade,
//!   optionally recording a [`Chart`] of typed tokens with spans into the
//!   original line
//! - **Detokenizer** ([`Detokenizer`]): spacing decisions, contraction
//!   re-fusion and attach-tag removal
//!
//! # Example
//!
//! ```rust
//! use utok_core::{Detokenizer, DetokenizerConfig, Tokenizer, TokenizerConfig};
//!
//! let tokenizer = Tokenizer::new(TokenizerConfig::builder().languages("eng").build()?)?;
//! let tokens = tokenizer.tokenize("Don't worry, it's well-known.");
//! assert_eq!(tokens, "Do n't worry , it 's well @-@ known .");
//!
//! let detokenizer = Detokenizer::new(DetokenizerConfig::builder().languages("eng").build()?)?;
//! assert_eq!(detokenizer.detokenize(&tokens), "Don't worry, it's well-known.");
//! # Ok::<(), utok_core::Error>(())
//! ```

pub mod charclass;
pub mod chart;
pub mod config;
pub mod decontract;
pub mod detokenizer;
pub mod error;
pub mod remap;
pub mod resource;
pub mod span;
pub mod tokenizer;

pub use chart::{AnnotationEntry, Chart, SentenceAnnotation, Token, TokenType};
pub use config::{DetokenizerConfig, DetokenizerConfigBuilder, TokenizerConfig, TokenizerConfigBuilder};
pub use detokenizer::Detokenizer;
pub use error::{ConfigError, Error, ResourceError, Result};
pub use resource::{LoadReport, ResourceSource, ResourceWarning};
pub use span::{ComplexSpan, SimpleSpan};
pub use tokenizer::{TokenizedLine, Tokenizer};
