//! Configuration file
//!
//! Values from a TOML file fill in whatever the command line leaves unset.

use crate::error::CliError;
use crate::output::AnnotationFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Tokenization defaults
    #[serde(default)]
    pub tokenizer: TokenizerSection,

    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceSection,
}

/// Tokenization defaults
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerSection {
    /// Language codes, e.g. "eng" or "fra,eng"
    pub language: Option<String>,

    /// Suppress attach-tag markup such as `@-@`
    pub simple: bool,

    /// Build a token chart for every line
    pub chart: bool,
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Annotation file format: "json" or "double-colon"
    pub annotation_format: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            annotation_format: "json".to_string(),
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceSection {
    /// Number of worker threads (0 = one per CPU)
    pub threads: usize,

    /// Batches with at least this many lines are processed in parallel
    /// (0 = only with --parallel)
    pub parallel_threshold_lines: usize,
}

impl CliConfig {
    /// Read a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.annotation_format()?;
        Ok(config)
    }

    /// Read `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                log::debug!("Configuration from {}: {:?}", path.display(), config);
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn annotation_format(&self) -> Result<AnnotationFormat, CliError> {
        match self.output.annotation_format.as_str() {
            "json" => Ok(AnnotationFormat::Json),
            "double-colon" | "dcln" => Ok(AnnotationFormat::DoubleColon),
            other => Err(CliError::InvalidAnnotationFormat(other.to_string())),
        }
    }

    /// Worker threads, resolving 0 to the number of CPUs
    pub fn worker_threads(&self, requested: Option<usize>) -> usize {
        match requested.unwrap_or(self.performance.threads) {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.tokenizer.language, None);
        assert!(!config.tokenizer.chart);
        assert_eq!(config.annotation_format().unwrap(), AnnotationFormat::Json);
        assert_eq!(config.performance.parallel_threshold_lines, 0);
    }

    #[test]
    fn test_partial_file() {
        let config = CliConfig::from_toml(
            r#"
[tokenizer]
language = "fra"
simple = true

[output]
annotation_format = "double-colon"
"#,
        )
        .unwrap();
        assert_eq!(config.tokenizer.language.as_deref(), Some("fra"));
        assert!(config.tokenizer.simple);
        assert!(!config.tokenizer.chart);
        assert_eq!(config.annotation_format().unwrap(), AnnotationFormat::DoubleColon);
        assert_eq!(config.performance, PerformanceSection::default());
    }

    #[test]
    fn test_rejects_unknown_keys_and_formats() {
        assert!(CliConfig::from_toml("[tokenizer]\nlanguages = \"eng\"\n").is_err());
        assert!(CliConfig::from_toml("[output]\nannotation_format = \"xml\"\n").is_err());
    }

    #[test]
    fn test_worker_threads() {
        let mut config = CliConfig::default();
        assert!(config.worker_threads(None) >= 1);
        assert_eq!(config.worker_threads(Some(3)), 3);
        config.performance.threads = 2;
        assert_eq!(config.worker_threads(None), 2);
    }

    #[test]
    fn test_from_file_roundtrip() {
        let mut config = CliConfig::default();
        config.tokenizer.language = Some("eng".into());
        config.performance.parallel_threshold_lines = 500;

        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), toml::to_string(&config).unwrap()).unwrap();
        assert_eq!(CliConfig::from_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/utok.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
