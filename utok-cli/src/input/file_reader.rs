//! Line-batched reading of files and standard input

use super::decode::decode_line;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// Where input lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    Files(Vec<PathBuf>),
}

impl InputSource {
    /// Display name for log messages
    pub fn describe(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::Files(files) => files
                .iter()
                .map(|f| f.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Read the source in batches of at most `batch_size` lines
    pub fn batches(&self, batch_size: usize) -> LineBatches {
        let pending = match self {
            InputSource::Stdin => VecDeque::from([Pending::Stdin]),
            InputSource::Files(files) => files.iter().cloned().map(Pending::File).collect(),
        };
        LineBatches {
            pending,
            current: None,
            batch_size: batch_size.max(1),
            next_line_number: 1,
        }
    }
}

#[derive(Debug)]
enum Pending {
    Stdin,
    File(PathBuf),
}

/// Consecutive input lines, numbered across all files starting at 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub first_line_number: usize,
    pub lines: Vec<String>,
}

/// Iterator over the line batches of an [`InputSource`]
pub struct LineBatches {
    pending: VecDeque<Pending>,
    current: Option<(String, Box<dyn BufRead>)>,
    batch_size: usize,
    next_line_number: usize,
}

impl LineBatches {
    fn open_next(&mut self) -> Result<bool> {
        let Some(next) = self.pending.pop_front() else {
            return Ok(false);
        };
        let reader: (String, Box<dyn BufRead>) = match next {
            Pending::Stdin => ("<stdin>".to_string(), Box::new(io::stdin().lock())),
            Pending::File(path) => {
                let file = File::open(&path)
                    .with_context(|| format!("Failed to open input file: {}", path.display()))?;
                log::debug!("Reading {}", path.display());
                (path.display().to_string(), Box::new(BufReader::new(file)))
            }
        };
        self.current = Some(reader);
        Ok(true)
    }

    fn fill(&mut self) -> Result<Option<Batch>> {
        let first_line_number = self.next_line_number;
        let mut lines = Vec::with_capacity(self.batch_size);
        let mut buf = Vec::new();

        while lines.len() < self.batch_size {
            if self.current.is_none() && !self.open_next()? {
                break;
            }
            let Some((name, reader)) = self.current.as_mut() else {
                break;
            };
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .with_context(|| format!("Failed to read from {name}"))?;
            if n == 0 {
                self.current = None;
                continue;
            }
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            lines.push(decode_line(&buf, self.next_line_number).into_owned());
            self.next_line_number += 1;
        }

        Ok((!lines.is_empty()).then_some(Batch {
            first_line_number,
            lines,
        }))
    }
}

impl Iterator for LineBatches {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.fill() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => None,
            Err(e) => {
                self.pending.clear();
                self.current = None;
                Some(Err(e))
            }
        }
    }
}
