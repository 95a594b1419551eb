//! Tokenize command implementation

use super::executor::LineExecutor;
use super::{init_logging, log_level, IoArgs, RunArgs, RunLog};
use crate::config::CliConfig;
use crate::input::input_source;
use crate::output::{open_output, AnnotationFormat, LineWriter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use utok_core::{Tokenizer, TokenizerConfig};

/// Arguments for the tokenize command
#[derive(Debug, Clone, Default, Args)]
pub struct TokenizeArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Write token annotations (spans, types, surfaces) to FILE
    #[arg(short, long, value_name = "FILE")]
    pub annotation_file: Option<PathBuf>,

    /// Annotation file format (default: json)
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub annotation_format: Option<AnnotationFormat>,

    /// Build a token chart for every line (implied by --annotation-file)
    #[arg(short, long)]
    pub chart: bool,

    /// Plain tokens without attach-tag markup such as @-@
    #[arg(long)]
    pub simple: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

impl TokenizeArgs {
    /// Execute the tokenize command
    pub fn execute(&self) -> Result<()> {
        init_logging(log_level(self.run.verbose), self.run.quiet);
        log::debug!("Arguments: {self:?}");

        let config = CliConfig::load(self.run.config.as_deref())?;
        let languages = self.run.languages(&config);
        let chart = self.chart || config.tokenizer.chart || self.annotation_file.is_some();
        let simple = self.simple || config.tokenizer.simple;
        let annotation_format = match self.annotation_format {
            Some(format) => format,
            None => config.annotation_format()?,
        };

        let tokenizer = Tokenizer::new(self.tokenizer_config(languages.as_deref(), chart, simple)?)
            .context("Failed to load tokenizer resources")?;

        let input = input_source(&self.io.input)?;
        let run_log = RunLog::start(self.run.verbose, || {
            let mut info = format!("utok tokenize  Input: {}", input.describe());
            if let Some(output) = &self.io.output {
                info += &format!("  Output: {}", output.display());
            }
            if let Some(annotation) = &self.annotation_file {
                info += &format!("  Annotation: {} ({annotation_format:?})", annotation.display());
            }
            if chart {
                info += "  Chart to be built: true";
            }
            if simple {
                info += "  Simple tokenization (no @-@ etc.): true";
            }
            if let Some(lc) = &languages {
                info += &format!("  Language: {lc}");
            }
            info
        });

        let mut out = LineWriter::new(open_output(self.io.output.as_deref())?);
        let mut annotations = match &self.annotation_file {
            Some(path) => Some(annotation_format.formatter(open_output(Some(path))?)),
            None => None,
        };
        let executor = LineExecutor::new(&self.run, &config)?;
        let progress = ProgressReporter::new(self.run.quiet, "tokenized");

        for batch in input.batches(executor.batch_size()) {
            let batch = batch?;
            let first = batch.first_line_number;
            let lines = &batch.lines;
            let tokenized = executor.run(
                lines.len(),
                || tokenizer.process_lines(lines, first),
                || {
                    lines
                        .iter()
                        .enumerate()
                        .map(|(i, line)| tokenizer.process_line(line, first + i))
                        .collect::<Vec<_>>()
                },
            );

            for line in &tokenized {
                out.write_line(&line.text)?;
                if let (Some(formatter), Some(chart)) = (annotations.as_mut(), &line.chart) {
                    formatter.write_annotation(&chart.annotation())?;
                }
            }
            progress.lines_completed(tokenized.len());
        }

        out.finish().context("Failed to write tokenized output")?;
        if let Some(formatter) = annotations.as_mut() {
            formatter.finish().context("Failed to write annotation file")?;
        }
        progress.finish();
        run_log.finish(out.lines());
        Ok(())
    }

    fn tokenizer_config(
        &self,
        languages: Option<&str>,
        chart: bool,
        simple: bool,
    ) -> Result<TokenizerConfig> {
        let mut builder = TokenizerConfig::builder()
            .chart(chart)
            .simple(simple)
            .first_token_is_line_id(self.run.first_token_is_line_id);
        if let Some(languages) = languages {
            builder = builder.languages(languages);
        }
        if let Some(dir) = &self.run.data_directory {
            builder = builder.data_dir(dir);
        }
        Ok(builder.build()?)
    }
}
