//! CLI command implementations

use crate::config::CliConfig;
use crate::error::CliResult;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod detokenize;
pub mod executor;
pub mod generate_config;
pub mod list;
pub mod tokenize;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Tokenize text, one output line per input line
    Tokenize(tokenize::TokenizeArgs),

    /// Turn tokenized text back into running text
    Detokenize(detokenize::DetokenizeArgs),

    /// Check resource files for malformed rules
    Validate(validate::ValidateArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: list::ListCommands,
    },

    /// Write a commented configuration file template
    GenerateConfig(generate_config::GenerateConfigArgs),
}

impl Commands {
    pub fn execute(&self) -> CliResult<()> {
        match self {
            Commands::Tokenize(args) => args.execute(),
            Commands::Detokenize(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
            Commands::List { subcommand } => subcommand.execute(),
            Commands::GenerateConfig(args) => args.execute(),
        }
    }
}

/// Input and output streams
#[derive(Debug, Clone, Default, Args)]
pub struct IoArgs {
    /// Input files or glob patterns (default: stdin)
    #[arg(short, long, value_name = "FILE/PATTERN")]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Options shared by tokenize and detokenize
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// ISO 639-3 language code(s), e.g. eng or "fra,eng"; the first is primary
    #[arg(long = "lc", value_name = "CODES")]
    pub lc: Option<String>,

    /// Directory with resource files (default: built-in resources)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub data_directory: Option<PathBuf>,

    /// The first token of each line is a line id that is copied unchanged
    #[arg(short = 'f', long)]
    pub first_token_is_line_id: bool,

    /// Process batches of lines in parallel
    #[arg(short, long)]
    pub parallel: bool,

    /// Number of worker threads for parallel processing (default: one per CPU)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Configuration file
    #[arg(long, value_name = "FILE", env = "UTOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Suppress logging and progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl RunArgs {
    /// Language codes from the command line, else from the configuration file
    pub fn languages(&self, config: &CliConfig) -> Option<String> {
        self.lc.clone().or_else(|| config.tokenizer.language.clone())
    }
}

/// Default log filter for a `-v` count
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize logging; `RUST_LOG` overrides `default_level`
pub fn init_logging(default_level: &str, quiet: bool) {
    if quiet {
        return;
    }
    // a logger installed earlier in the same process stays in place
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}

/// Start and end log lines of a run
pub(crate) struct RunLog {
    start: Instant,
    verbose: bool,
}

impl RunLog {
    const SLOW_RUN: Duration = Duration::from_secs(10);

    pub fn start(verbose: u8, describe: impl FnOnce() -> String) -> Self {
        if verbose > 0 {
            log::info!("Start: {}", describe());
        }
        Self {
            start: Instant::now(),
            verbose: verbose > 0,
        }
    }

    pub fn finish(&self, lines: usize) {
        let elapsed = self.start.elapsed();
        let noun = if lines == 1 { "line" } else { "lines" };
        if self.verbose {
            log::info!("End: elapsed time {elapsed:.3?}  Processed {lines} {noun}");
        } else if elapsed >= Self::SLOW_RUN {
            log::info!("Elapsed time: {} seconds for {lines} {noun}", elapsed.as_secs());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(2), "debug");
        assert_eq!(log_level(9), "trace");
    }

    #[test]
    fn test_languages_precedence() {
        let mut config = CliConfig::default();
        let mut args = RunArgs::default();
        assert_eq!(args.languages(&config), None);

        config.tokenizer.language = Some("fra".into());
        assert_eq!(args.languages(&config).as_deref(), Some("fra"));

        args.lc = Some("eng".into());
        assert_eq!(args.languages(&config).as_deref(), Some("eng"));
    }

    #[test]
    fn test_commands_debug_format() {
        let cmd = Commands::List {
            subcommand: list::ListCommands::Formats,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("List"));
        assert!(debug_str.contains("Formats"));
    }
}
