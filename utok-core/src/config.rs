//! Tokenizer and detokenizer configuration

use crate::error::{ConfigError, Result};
use crate::resource::line::split_lang_codes;
use crate::resource::ResourceSource;
use std::path::PathBuf;

fn validate_language(code: &str) -> std::result::Result<(), ConfigError> {
    let mut chars = code.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidLanguageCode(code.to_string()))
    }
}

fn parse_attach_tag(tag: &str) -> std::result::Result<char, ConfigError> {
    let mut chars = tag.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Ok(c),
        _ => Err(ConfigError::InvalidAttachTag(tag.to_string())),
    }
}

fn resource_source(data_dir: &Option<PathBuf>) -> ResourceSource {
    match data_dir {
        Some(dir) => ResourceSource::Directory(dir.clone()),
        None => ResourceSource::Embedded,
    }
}

fn validate_common(languages: &[String], data_dir: &Option<PathBuf>) -> std::result::Result<(), ConfigError> {
    for code in languages {
        validate_language(code)?;
    }
    if let Some(dir) = data_dir {
        if !dir.is_dir() {
            return Err(ConfigError::MissingDataDir(dir.clone()));
        }
    }
    Ok(())
}

/// Configuration for [`Tokenizer`](crate::Tokenizer)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// ISO 639-3 language codes; the first one is the primary language
    pub languages: Vec<String>,

    /// Directory with resource files (None = embedded resources)
    pub data_dir: Option<PathBuf>,

    /// Build a span-annotated chart for every line
    pub chart: bool,

    /// Plain tokenization without attach-tag markup such as `@-@`
    pub simple: bool,

    /// The first token of every line is an id that is echoed, not tokenized
    pub first_token_is_line_id: bool,

    /// Overrides the `::attach-tag` of the detokenization resources
    pub attach_tag: Option<char>,
}

impl TokenizerConfig {
    pub fn builder() -> TokenizerConfigBuilder {
        TokenizerConfigBuilder::new()
    }

    /// Language used for language-specific stages and rule conditions
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }

    pub fn resource_source(&self) -> ResourceSource {
        resource_source(&self.data_dir)
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(&self.languages, &self.data_dir)?;
        Ok(())
    }
}

/// Fluent builder for [`TokenizerConfig`]
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfigBuilder {
    config: TokenizerConfig,
    attach_tag: Option<String>,
}

impl TokenizerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language list, e.g. `"eng"` or `"spa, cat"`
    pub fn languages(mut self, codes: &str) -> Self {
        self.config.languages = split_lang_codes(codes);
        self
    }

    /// Append one language code
    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.config.languages.push(code.into());
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    pub fn chart(mut self, chart: bool) -> Self {
        self.config.chart = chart;
        self
    }

    pub fn simple(mut self, simple: bool) -> Self {
        self.config.simple = simple;
        self
    }

    pub fn first_token_is_line_id(mut self, enabled: bool) -> Self {
        self.config.first_token_is_line_id = enabled;
        self
    }

    /// Attach tag to use instead of the one the resources declare
    pub fn attach_tag(mut self, tag: impl Into<String>) -> Self {
        self.attach_tag = Some(tag.into());
        self
    }

    pub fn build(mut self) -> Result<TokenizerConfig> {
        if let Some(tag) = &self.attach_tag {
            self.config.attach_tag = Some(parse_attach_tag(tag)?);
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for [`Detokenizer`](crate::Detokenizer)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetokenizerConfig {
    pub languages: Vec<String>,
    pub data_dir: Option<PathBuf>,
    pub first_token_is_line_id: bool,
    pub attach_tag: Option<char>,
}

impl DetokenizerConfig {
    pub fn builder() -> DetokenizerConfigBuilder {
        DetokenizerConfigBuilder::new()
    }

    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }

    pub fn resource_source(&self) -> ResourceSource {
        resource_source(&self.data_dir)
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(&self.languages, &self.data_dir)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetokenizerConfigBuilder {
    config: DetokenizerConfig,
    attach_tag: Option<String>,
}

impl DetokenizerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn languages(mut self, codes: &str) -> Self {
        self.config.languages = split_lang_codes(codes);
        self
    }

    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.config.languages.push(code.into());
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    pub fn first_token_is_line_id(mut self, enabled: bool) -> Self {
        self.config.first_token_is_line_id = enabled;
        self
    }

    pub fn attach_tag(mut self, tag: impl Into<String>) -> Self {
        self.attach_tag = Some(tag.into());
        self
    }

    pub fn build(mut self) -> Result<DetokenizerConfig> {
        if let Some(tag) = &self.attach_tag {
            self.config.attach_tag = Some(parse_attach_tag(tag)?);
        }
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_language_list() {
        let config = TokenizerConfig::builder()
            .languages("spa, cat;eng-global")
            .chart(true)
            .build()
            .unwrap();
        assert_eq!(config.languages, vec!["spa", "cat", "eng-global"]);
        assert_eq!(config.primary_language(), Some("spa"));
        assert!(config.chart);
        assert_eq!(config.resource_source(), ResourceSource::Embedded);
    }

    #[test]
    fn test_invalid_language() {
        let err = TokenizerConfig::builder().language("").build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidLanguageCode(_))));
        let err = DetokenizerConfig::builder().language("e n").build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidLanguageCode(_))));
    }

    #[test]
    fn test_attach_tag() {
        let config = TokenizerConfig::builder().attach_tag("~").build().unwrap();
        assert_eq!(config.attach_tag, Some('~'));
        for bad in ["", " ", "@@"] {
            let err = TokenizerConfig::builder().attach_tag(bad).build().unwrap_err();
            assert!(matches!(err, Error::Config(ConfigError::InvalidAttachTag(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = DetokenizerConfig::builder().data_dir(&missing).build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingDataDir(_))));

        let config = DetokenizerConfig::builder().data_dir(dir.path()).build().unwrap();
        assert_eq!(
            config.resource_source(),
            ResourceSource::Directory(dir.path().to_path_buf())
        );
    }
}
