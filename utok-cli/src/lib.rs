//! utok CLI library
//!
//! This library provides the command-line interface for the utok
//! tokenizer and detokenizer: argument handling, input decoding,
//! annotation output and progress reporting.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
