//! Output formatting module

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use utok_core::SentenceAnnotation;

/// Trait for annotation formatters
pub trait AnnotationFormatter: Send {
    /// Format and output the annotation of one line
    fn write_annotation(&mut self, annotation: &SentenceAnnotation) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod double_colon;
pub mod json;
pub mod text;

pub use double_colon::DoubleColonFormatter;
pub use json::JsonFormatter;
pub use text::LineWriter;

/// Supported annotation formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AnnotationFormat {
    /// JSON array with one object per line
    Json,
    /// `::line`/`::span` records for human consumption
    DoubleColon,
}

impl AnnotationFormat {
    pub fn formatter<W: Write + Send + 'static>(self, writer: W) -> Box<dyn AnnotationFormatter> {
        match self {
            AnnotationFormat::Json => Box::new(JsonFormatter::new(writer)),
            AnnotationFormat::DoubleColon => Box::new(DoubleColonFormatter::new(writer)),
        }
    }
}

/// Buffered writer for `path`, or stdout
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
