//! Progress reporting interface
//!
//! The orchestrator reports through a [`ProgressReporter`] passed in by the
//! caller. The terminal implementation lives in `cli::progress`; tests and
//! headless runs use [`NoopProgress`].

use super::MirrorResult;

/// Completed/total pair for one progress axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    pub completed: usize,
    pub total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    pub fn advance(&mut self) {
        self.completed += 1;
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Emitted once per completed repository.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    pub result: &'a MirrorResult,
    pub bucket: &'a str,
    pub overall: ProgressCounter,
    pub bucket_progress: ProgressCounter,
}

/// Receives progress updates from the orchestrator.
///
/// Calls are made from the single collecting task, in completion order.
pub trait ProgressReporter: Send + Sync {
    /// Called once before any work starts, with bucket names and sizes in
    /// display order.
    fn start(&self, _total: usize, _buckets: &[(String, usize)]) {}

    fn advance(&self, event: &ProgressEvent<'_>);

    fn finish(&self) {}
}

/// Reporter that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn advance(&self, _event: &ProgressEvent<'_>) {}
}
