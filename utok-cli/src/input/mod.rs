//! Input handling module

pub mod decode;
pub mod file_reader;
pub mod glob_resolver;

pub use decode::decode_line;
pub use file_reader::{Batch, InputSource, LineBatches};
pub use glob_resolver::resolve_patterns;

use anyhow::Result;

/// Input source for command-line patterns; none or `-` means stdin
pub fn input_source(patterns: &[String]) -> Result<InputSource> {
    if patterns.is_empty() || patterns.iter().all(|p| p == "-") {
        return Ok(InputSource::Stdin);
    }
    Ok(InputSource::Files(resolve_patterns(patterns)?))
}
