//! utok command-line entry point

use clap::Parser;
use utok_cli::commands::Commands;

/// Multilingual tokenizer and detokenizer
#[derive(Debug, Parser)]
#[command(name = "utok", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = cli.command.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
