//! Rule resources: loading, validation, expansion and lookup
//!
//! Resource files are UTF-8 text with one double-colon rule per line.
//! Malformed lines never abort loading; they are reported as
//! [`ResourceWarning`]s in the [`LoadReport`] of the file and skipped.

pub mod detok;
pub mod embedded;
pub mod entry;
pub mod expand;
pub mod line;
pub mod store;
pub mod tld;
pub mod trie;

pub use detok::{AttachRule, ContractionRule, DetokRules, MarkupRule};
pub use entry::{Conditions, ContextMatchers, RuleEntry, RuleKind, SplitSide};
pub use store::{PrefixClass, RuleStore};
pub use tld::TopLevelDomains;

use crate::error::ResourceError;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Problem found in a single resource line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarningKind {
    #[error("found no slots")]
    NoSlots,
    #[error("found invalid head-slot ::{0}")]
    InvalidHead(String),
    #[error("found duplicate slot ::{0}")]
    DuplicateSlot(String),
    #[error("found unexpected slot ::{0}")]
    UnexpectedSlot(String),
    #[error("missing required slot ::{0}")]
    MissingRequiredSlot(String),
    #[error("suspected spurious colon in '{0}'")]
    SpuriousColon(String),
    #[error("suspected missing space in '{0}'")]
    MissingSpace(String),
    #[error("suspected missing colon in '{0}'")]
    MissingColon(String),
    #[error("number of target elements ({targets}) and number of char-split elements ({splits}) don't match")]
    CharSplitCount { targets: usize, splits: usize },
    #[error("length of contraction ({length}) and sum of char-split elements ({sum}) don't match")]
    CharSplitLength { length: usize, sum: usize },
    #[error("ignoring ill-formed ::char-split {0} (value should be comma-separated integers, e.g. 2,3)")]
    CharSplitSyntax(String),
    #[error("invalid side {0} (should be one of start/end/both)")]
    InvalidSide(String),
    #[error("invalid side {0} (should be one of left/right/both)")]
    InvalidAttachSide(String),
    #[error("invalid attach tag '{0}' (should be a single non-space character)")]
    InvalidAttachTag(String),
    #[error("regex compile error for {surface} ::{slot} {pattern}")]
    RegexCompile {
        surface: String,
        slot: String,
        pattern: String,
    },
    #[error("duplicate ::auto-attach {surface} ::side {side}{lcode_clause}")]
    DuplicateAutoAttach {
        surface: String,
        side: &'static str,
        lcode_clause: String,
    },
}

/// A [`WarningKind`] located in a resource file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceWarning {
    pub source: String,
    pub line: usize,
    pub kind: WarningKind,
}

impl fmt::Display for ResourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in line {} in {}", self.kind, self.line, self.source)
    }
}

/// Outcome of loading one resource file
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub source: String,
    pub lines: usize,
    pub entries: usize,
    pub expanded_lines: usize,
    pub warnings: Vec<ResourceWarning>,
}

impl LoadReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub(crate) fn warn(&mut self, line: usize, kinds: impl IntoIterator<Item = WarningKind>) {
        for kind in kinds {
            let warning = ResourceWarning {
                source: self.source.clone(),
                line,
                kind,
            };
            log::warn!("{warning}");
            self.warnings.push(warning);
        }
    }

    pub(crate) fn log_summary(&self) {
        let expanded = if self.expanded_lines > 0 {
            format!(" (plus {} expanded lines)", self.expanded_lines)
        } else {
            String::new()
        };
        log::info!(
            "Loaded {} entries from {} lines{} in {}",
            self.entries,
            self.lines,
            expanded,
            self.source
        );
    }
}

/// Where resource files are read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceSource {
    /// Files compiled into the crate
    #[default]
    Embedded,
    /// A directory of resource files
    Directory(PathBuf),
}

impl ResourceSource {
    /// Read resource file `name`; `Ok(None)` if it does not exist
    pub fn read(&self, name: &str) -> Result<Option<Cow<'static, str>>, ResourceError> {
        match self {
            Self::Embedded => Ok(embedded::get(name).map(Cow::Borrowed)),
            Self::Directory(dir) => {
                let path = dir.join(name);
                match std::fs::read(&path) {
                    Ok(bytes) => Ok(Some(Cow::Owned(
                        String::from_utf8_lossy(&bytes).into_owned(),
                    ))),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(source) => Err(ResourceError::Io { path, source }),
                }
            }
        }
    }

    /// Read resource file `name` and hand its text to `load`
    ///
    /// Returns `Ok(None)` without calling `load` if the file does not exist.
    pub fn load<F>(&self, name: &str, load: F) -> Result<Option<LoadReport>, ResourceError>
    where
        F: FnOnce(&str, &str) -> LoadReport,
    {
        let Some(text) = self.read(name)? else {
            return Ok(None);
        };
        Ok(Some(load(&text, &self.describe(name))))
    }

    /// Display name of resource file `name`
    pub fn describe(&self, name: &str) -> String {
        match self {
            Self::Embedded => format!("<embedded>/{name}"),
            Self::Directory(dir) => dir.join(name).display().to_string(),
        }
    }
}

/// Loads a sequence of resource files from one source and keeps their reports
#[derive(Debug)]
pub(crate) struct ResourceLoader<'a> {
    source: &'a ResourceSource,
    reports: Vec<LoadReport>,
    tried: Vec<String>,
}

impl<'a> ResourceLoader<'a> {
    pub fn new(source: &'a ResourceSource) -> Self {
        Self {
            source,
            reports: Vec::new(),
            tried: Vec::new(),
        }
    }

    /// Load `name` if it exists
    pub fn load<F>(&mut self, name: &str, load: F) -> Result<bool, ResourceError>
    where
        F: FnOnce(&str, &str) -> LoadReport,
    {
        self.tried.push(name.to_string());
        match self.source.load(name, load)? {
            Some(report) => {
                self.reports.push(report);
                Ok(true)
            }
            None => {
                log::debug!("No resource file {}", self.source.describe(name));
                Ok(false)
            }
        }
    }

    /// Load the rule file of language `lang`; a missing file only warns
    pub fn load_language<F>(&mut self, lang: &str, load: F) -> Result<bool, ResourceError>
    where
        F: FnOnce(&str, &str) -> LoadReport,
    {
        let name = format!("tok-resource-{lang}.txt");
        let found = self.load(&name, load)?;
        if !found {
            log::warn!(
                "No language-specific resource {}; falling back to language-independent rules",
                self.source.describe(&name)
            );
        }
        Ok(found)
    }

    /// Reports of all loaded files; fails if none was found
    pub fn finish(self) -> Result<Vec<LoadReport>, ResourceError> {
        if self.reports.is_empty() {
            return Err(ResourceError::NoRuleSource {
                tried: self
                    .tried
                    .iter()
                    .map(|name| self.source.describe(name))
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        Ok(self.reports)
    }
}

/// Length-preserving lowercase of one character
///
/// `İ` maps to `i` rather than to `i` plus a combining dot.
pub fn lower_char(c: char) -> char {
    if c == 'İ' {
        return 'i';
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Lowercase with one output character per input character
pub fn lowercase(s: &str) -> String {
    s.chars().map(lower_char).collect()
}
