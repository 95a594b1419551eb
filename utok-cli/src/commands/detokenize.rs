//! Detokenize command implementation

use super::executor::LineExecutor;
use super::{init_logging, log_level, IoArgs, RunArgs, RunLog};
use crate::config::CliConfig;
use crate::input::input_source;
use crate::output::{open_output, LineWriter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use utok_core::{Detokenizer, DetokenizerConfig};

/// Arguments for the detokenize command
#[derive(Debug, Clone, Default, Args)]
pub struct DetokenizeArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

impl DetokenizeArgs {
    /// Execute the detokenize command
    pub fn execute(&self) -> Result<()> {
        init_logging(log_level(self.run.verbose), self.run.quiet);
        log::debug!("Arguments: {self:?}");

        let config = CliConfig::load(self.run.config.as_deref())?;
        let languages = self.run.languages(&config);

        let mut builder = DetokenizerConfig::builder()
            .first_token_is_line_id(self.run.first_token_is_line_id);
        if let Some(languages) = &languages {
            builder = builder.languages(languages);
        }
        if let Some(dir) = &self.run.data_directory {
            builder = builder.data_dir(dir);
        }
        let detokenizer =
            Detokenizer::new(builder.build()?).context("Failed to load detokenizer resources")?;

        let input = input_source(&self.io.input)?;
        let run_log = RunLog::start(self.run.verbose, || {
            let mut info = format!("utok detokenize  Input: {}", input.describe());
            if let Some(output) = &self.io.output {
                info += &format!("  Output: {}", output.display());
            }
            if let Some(lc) = &languages {
                info += &format!("  Language: {lc}");
            }
            info
        });

        let mut out = LineWriter::new(open_output(self.io.output.as_deref())?);
        let executor = LineExecutor::new(&self.run, &config)?;
        let progress = ProgressReporter::new(self.run.quiet, "detokenized");

        for batch in input.batches(executor.batch_size()) {
            let batch = batch?;
            let lines = &batch.lines;
            let detokenized = executor.run(
                lines.len(),
                || detokenizer.process_lines(lines),
                || {
                    lines
                        .iter()
                        .map(|line| detokenizer.process_line(line))
                        .collect::<Vec<_>>()
                },
            );
            for line in &detokenized {
                out.write_line(line)?;
            }
            progress.lines_completed(detokenized.len());
        }

        out.finish().context("Failed to write detokenized output")?;
        progress.finish();
        run_log.finish(out.lines());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detokenize_with_line_ids() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.tok");
        fs::write(&input, "s1 Do n't worry !\ns2 Sold , for $ 9,999.99 on ebay.com .\n").unwrap();

        let args = DetokenizeArgs {
            io: IoArgs {
                input: vec![input.display().to_string()],
                output: Some(dir.path().join("output.txt")),
            },
            run: RunArgs {
                lc: Some("eng".into()),
                first_token_is_line_id: true,
                quiet: true,
                ..RunArgs::default()
            },
        };
        args.execute().unwrap();

        let output = fs::read_to_string(dir.path().join("output.txt")).unwrap();
        assert_eq!(output, "s1 Don't worry!\ns2 Sold, for $9,999.99 on ebay.com.\n");
    }
}
