//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Default language code(s) to put into the template
    #[arg(short = 'l', long, value_name = "CODES", default_value = "eng")]
    pub language: String,

    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        let template = self.generate_template();
        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template written to {}", self.output.display());
        println!();
        println!("Use it with:");
        println!("   utok tokenize --config {} -i input.txt", self.output.display());
        Ok(())
    }

    /// Generate template configuration content
    fn generate_template(&self) -> String {
        format!(
            r#"# utok configuration
#
# Command-line options take precedence over the values below.
# Pass this file with --config FILE or the UTOK_CONFIG environment variable.

[tokenizer]
# ISO 639-3 language code(s); the first is the primary language.
# Several codes are separated by commas, e.g. "fra,eng".
language = "{}"

# Leave out attach-tag markup such as @-@ (output is then not reversible).
simple = false

# Build a token chart for every line. Implied by --annotation-file.
chart = false

[output]
# Annotation file format: "json" or "double-colon"
annotation_format = "json"

[performance]
# Worker threads for parallel processing (0 = one per CPU)
threads = 0

# Process batches with at least this many lines in parallel
# even without --parallel (0 = only with --parallel)
parallel_threshold_lines = 0
"#,
            self.language
        )
    }
}
