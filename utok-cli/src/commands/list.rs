//! List command implementation

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};
use utok_core::resource::embedded;

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List languages with a dedicated rule file
    Languages {
        /// Look in this resource directory instead of the built-in resources
        #[arg(short = 'd', long, value_name = "DIR")]
        data_directory: Option<PathBuf>,
    },

    /// List available annotation formats
    Formats,
}

impl ListCommands {
    pub fn execute(&self) -> Result<()> {
        match self {
            ListCommands::Languages { data_directory } => {
                let languages = match data_directory {
                    Some(dir) => directory_languages(dir)?,
                    None => embedded::languages().into_iter().map(str::to_string).collect(),
                };
                for code in languages {
                    println!("{code}");
                }
            }
            ListCommands::Formats => {
                println!("json          JSON array, one object per line (default)");
                println!("double-colon  ::line/::span records");
            }
        }
        Ok(())
    }
}

/// Language codes of the `tok-resource-{lc}.txt` files in `dir`, sorted
pub fn directory_languages(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory: {}", dir.display()))?;
    let mut languages = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read data directory: {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(code) = name
            .strip_prefix("tok-resource-")
            .and_then(|rest| rest.strip_suffix(".txt"))
        {
            if code != "eng-global" {
                languages.push(code.to_string());
            }
        }
    }
    languages.sort();
    Ok(languages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_languages() {
        let dir = TempDir::new().unwrap();
        for name in [
            "tok-resource-fra.txt",
            "tok-resource-eng.txt",
            "tok-resource-eng-global.txt",
            "tok-resource.txt",
            "detok-resource.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        assert_eq!(directory_languages(dir.path()).unwrap(), vec!["eng", "fra"]);
    }

    #[test]
    fn test_missing_directory() {
        assert!(directory_languages(Path::new("/nonexistent/utok-data")).is_err());
    }
}
