//! Progress reporting module

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Line counter shown on stderr while processing
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create a new progress reporter; `quiet` disables all output
    pub fn new(quiet: bool, verb: &str) -> Self {
        if quiet {
            return Self { progress_bar: None };
        }

        // hidden automatically when stderr is not a terminal
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {human_pos} lines {msg} ({per_sec})")
        {
            pb.set_style(style);
        }
        pb.set_message(verb.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    /// Count `lines` more processed lines
    pub fn lines_completed(&self, lines: usize) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(lines as u64);
        }
    }

    /// Finish progress reporting
    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_lines() {
        let progress = ProgressReporter::new(false, "tokenized");
        progress.lines_completed(3);
        progress.lines_completed(2);
        assert_eq!(progress.progress_bar.as_ref().map(ProgressBar::position), Some(5));
        progress.finish();
    }

    #[test]
    fn test_quiet_has_no_bar() {
        let progress = ProgressReporter::new(true, "tokenized");
        progress.lines_completed(1);
        assert!(progress.progress_bar.is_none());
        progress.finish();
    }
}
