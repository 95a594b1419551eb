//! Sequential or thread-pool execution of line batches

use super::RunArgs;
use crate::config::CliConfig;
use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Lines read per batch unless the parallel threshold asks for more
pub const BATCH_LINES: usize = 1024;

/// Decides per batch whether lines are processed on the thread pool
pub struct LineExecutor {
    pool: Option<ThreadPool>,
    always: bool,
    threshold: usize,
}

impl LineExecutor {
    pub fn new(args: &RunArgs, config: &CliConfig) -> Result<Self> {
        let threshold = config.performance.parallel_threshold_lines;
        let pool = if args.parallel || threshold > 0 {
            let threads = config.worker_threads(args.threads);
            log::debug!("Using {threads} worker threads");
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .context("Failed to build worker thread pool")?,
            )
        } else {
            None
        };
        Ok(Self {
            pool,
            always: args.parallel,
            threshold,
        })
    }

    /// Number of lines to read per batch
    pub fn batch_size(&self) -> usize {
        BATCH_LINES.max(self.threshold)
    }

    /// Whether a batch of `len` lines goes to the thread pool
    pub fn is_parallel(&self, len: usize) -> bool {
        self.pool.is_some() && (self.always || (self.threshold > 0 && len >= self.threshold))
    }

    /// Run `parallel` on the pool for large enough batches, `sequential` otherwise
    pub fn run<T, P, S>(&self, len: usize, parallel: P, sequential: S) -> T
    where
        T: Send,
        P: FnOnce() -> T + Send,
        S: FnOnce() -> T,
    {
        match &self.pool {
            Some(pool) if self.is_parallel(len) => pool.install(parallel),
            _ => sequential(),
        }
    }
}
