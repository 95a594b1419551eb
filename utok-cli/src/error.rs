//! Error handling for the CLI application

use std::fmt;

/// Errors raised by the CLI itself rather than by the tokenizer library
#[derive(Debug)]
pub enum CliError {
    /// No input file matched the given patterns
    NoInputFiles(String),
    /// Unknown annotation format name in a configuration file
    InvalidAnnotationFormat(String),
    /// Resource validation found problems
    ValidationFailed { warnings: usize, files: usize },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NoInputFiles(patterns) => write!(f, "No files found matching: {patterns}"),
            CliError::InvalidAnnotationFormat(name) => write!(
                f,
                "Invalid annotation format: {name} (expected json or double-colon)"
            ),
            CliError::ValidationFailed { warnings, files } => {
                let plural = if *warnings == 1 { "" } else { "s" };
                write!(f, "Validation failed: {warnings} warning{plural} in {files} file(s)")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_files_display() {
        let error = CliError::NoInputFiles("*.txt".to_string());
        assert_eq!(error.to_string(), "No files found matching: *.txt");
    }

    #[test]
    fn test_invalid_annotation_format_display() {
        let error = CliError::InvalidAnnotationFormat("xml".to_string());
        assert!(error.to_string().contains("xml"));
        assert!(error.to_string().contains("double-colon"));
    }

    #[test]
    fn test_validation_failed_display() {
        let one = CliError::ValidationFailed { warnings: 1, files: 2 };
        assert_eq!(one.to_string(), "Validation failed: 1 warning in 2 file(s)");
        let many = CliError::ValidationFailed { warnings: 3, files: 1 };
        assert_eq!(many.to_string(), "Validation failed: 3 warnings in 1 file(s)");
    }

    #[test]
    fn test_error_converts_to_anyhow() {
        let result: CliResult<()> = Err(CliError::NoInputFiles("in/*.txt".to_string()).into());
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
        assert_eq!(err.to_string(), "No files found matching: in/*.txt");
    }
}
