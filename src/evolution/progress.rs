//! Observational progress reporting.

use crate::schema::Record;

/// Receives one `advance` per generation boundary and one `finish` per run.
///
/// A full run advances `generations + 1` times, generation 0 included.
pub trait ProgressReporter {
    fn advance(&mut self, record: &Record);

    fn finish(&mut self, _n_gen: usize) {}
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn advance(&mut self, _record: &Record) {}
}

/// Reports progress through the `log` facade.
#[derive(Debug, Clone)]
pub struct LogProgress {
    total: usize,
    done: usize,
}

impl LogProgress {
    /// Expect `total` generation boundaries.
    pub fn new(total: usize) -> Self {
        Self { total, done: 0 }
    }

    /// Boundaries seen so far.
    pub fn done(&self) -> usize {
        self.done
    }
}

impl ProgressReporter for LogProgress {
    fn advance(&mut self, record: &Record) {
        self.done += 1;
        log::debug!(
            "Generation {} done ({}/{}), {} evaluations",
            record.generation,
            self.done,
            self.total,
            record.nevals
        );
    }

    fn finish(&mut self, n_gen: usize) {
        log::info!(
            "Evolution finished: {}/{} generation boundaries, n_gen = {}",
            self.done,
            self.total,
            n_gen
        );
    }
}
