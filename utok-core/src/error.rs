//! Error types for tokenizer and detokenizer construction

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating and reading rule resources
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A resource file exists but could not be read
    #[error("Failed to read resource file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither language-specific nor general rules could be loaded
    #[error("No rule source could be loaded (tried: {tried})")]
    NoRuleSource { tried: String },

    /// A language code was syntactically unusable
    #[error("Unknown language code: {0}")]
    UnknownLanguage(String),
}

/// Invalid tokenizer or detokenizer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid language code '{0}' (expected an ISO 639-3 code such as 'eng', optionally with a '-' suffix)")]
    InvalidLanguageCode(String),

    #[error("Invalid attach tag '{0}' (expected a single non-space character)")]
    InvalidAttachTag(String),

    #[error("Resource directory does not exist: {0}")]
    MissingDataDir(PathBuf),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for utok operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: Error = ResourceError::NoRuleSource {
            tried: "tok-resource.txt".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "No rule source could be loaded (tried: tok-resource.txt)"
        );

        let err: Error = ConfigError::InvalidLanguageCode("english".into()).into();
        assert!(err.to_string().contains("english"));
    }
}
