//! Validate command implementation

use super::{init_logging, log_level};
use crate::error::CliError;
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use utok_core::resource::line::split_lang_codes;
use utok_core::resource::{embedded, DetokRules, RuleStore, TopLevelDomains};
use utok_core::LoadReport;

/// Arguments for the validate command
#[derive(Debug, Clone, Default, Args)]
pub struct ValidateArgs {
    /// Resource files to check
    #[arg(value_name = "FILE", required_unless_present = "embedded")]
    pub files: Vec<PathBuf>,

    /// Check the built-in resource files instead
    #[arg(long, conflicts_with = "files")]
    pub embedded: bool,

    /// Resource kind (default: guessed from the file name)
    #[arg(long, value_enum)]
    pub kind: Option<ResourceKind>,

    /// Document language codes for ::lcode filtering of detokenization rules
    #[arg(long = "lc", value_name = "CODES")]
    pub lc: Option<String>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Kinds of resource files
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResourceKind {
    /// Tokenization rules (tok-resource*.txt)
    Tok,
    /// Detokenization rules (detok-resource*.txt)
    Detok,
    /// Top-level domain codes
    Tld,
}

impl ResourceKind {
    /// Kind of a file, from its name
    pub fn guess(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.starts_with("detok") {
            ResourceKind::Detok
        } else if name.contains("top-level-domain") {
            ResourceKind::Tld
        } else {
            ResourceKind::Tok
        }
    }

    /// Load `text` into a scratch rule table of this kind
    pub fn check(self, text: &str, source: &str, doc_langs: &[String]) -> LoadReport {
        match self {
            ResourceKind::Tok => RuleStore::new().load_str(text, source),
            ResourceKind::Detok => DetokRules::new().load_str(text, source, doc_langs),
            ResourceKind::Tld => TopLevelDomains::new().load_str(text, source),
        }
    }
}

impl ValidateArgs {
    /// Execute the validate command
    ///
    /// Every warning is printed; any warning makes the command fail.
    pub fn execute(&self) -> Result<()> {
        // warnings go to stdout below; the logger only adds detail with -v
        init_logging(if self.verbose == 0 { "error" } else { log_level(self.verbose) }, false);

        let doc_langs = self.lc.as_deref().map(split_lang_codes).unwrap_or_default();

        let reports = if self.embedded {
            self.check_embedded(&doc_langs)
        } else {
            self.check_files(&doc_langs)?
        };

        let mut warnings = 0;
        for report in &reports {
            if report.warnings.is_empty() {
                println!(
                    "✓ {}: {} entries from {} lines",
                    report.source, report.entries, report.lines
                );
            } else {
                println!("✗ {}: {} warning(s)", report.source, report.warnings.len());
                for warning in &report.warnings {
                    println!("  {warning}");
                }
            }
            warnings += report.warnings.len();
        }

        if warnings > 0 {
            return Err(CliError::ValidationFailed {
                warnings,
                files: reports.len(),
            }
            .into());
        }
        Ok(())
    }

    fn check_files(&self, doc_langs: &[String]) -> Result<Vec<LoadReport>> {
        self.files
            .iter()
            .map(|path| {
                let bytes = fs::read(path)
                    .with_context(|| format!("Failed to read resource file: {}", path.display()))?;
                let kind = self.kind.unwrap_or_else(|| ResourceKind::guess(path));
                log::info!("Checking {} as {kind:?} resource", path.display());
                Ok(kind.check(
                    &String::from_utf8_lossy(&bytes),
                    &path.display().to_string(),
                    doc_langs,
                ))
            })
            .collect()
    }

    fn check_embedded(&self, doc_langs: &[String]) -> Vec<LoadReport> {
        embedded::names()
            .into_iter()
            .filter_map(|name| {
                let text = embedded::get(name)?;
                let kind = ResourceKind::guess(Path::new(name));
                Some(kind.check(text, &format!("<embedded>/{name}"), doc_langs))
            })
            .collect()
    }
}
