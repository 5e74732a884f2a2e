//! Terminal progress: one overall bar plus one bar per bucket.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::collections::HashMap;
use std::sync::Mutex;

use super::output::Output;
use crate::mirror::{MirrorStatus, ProgressEvent, ProgressReporter};

pub struct TerminalProgress {
    multi: MultiProgress,
    overall: Mutex<Option<ProgressBar>>,
    buckets: Mutex<HashMap<String, ProgressBar>>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Bars that draw nowhere; used in tests.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            overall: Mutex::new(None),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    fn add_bar(&self, name: &str, len: usize) -> ProgressBar {
        let bar = self.multi.add(ProgressBar::new(len as u64));
        bar.set_style(Output::bar_style());
        bar.set_prefix(name.to_string());
        bar
    }

    /// Position of a bucket bar, if it exists.
    pub fn bucket_position(&self, bucket: &str) -> Option<u64> {
        let buckets = self.buckets.lock().expect("mutex poisoned");
        buckets.get(bucket).map(|b| b.position())
    }

    pub fn overall_position(&self) -> Option<u64> {
        let overall = self.overall.lock().expect("mutex poisoned");
        overall.as_ref().map(|b| b.position())
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for TerminalProgress {
    fn start(&self, total: usize, buckets: &[(String, usize)]) {
        let overall = self.add_bar("All projects", total);
        *self.overall.lock().expect("mutex poisoned") = Some(overall);

        let mut bars = self.buckets.lock().expect("mutex poisoned");
        for (name, size) in buckets {
            bars.insert(name.clone(), self.add_bar(name, *size));
        }
    }

    fn advance(&self, event: &ProgressEvent<'_>) {
        if let Some(bar) = self.overall.lock().expect("mutex poisoned").as_ref() {
            bar.set_position(event.overall.completed as u64);
        }

        let bars = self.buckets.lock().expect("mutex poisoned");
        if let Some(bar) = bars.get(event.bucket) {
            bar.set_position(event.bucket_progress.completed as u64);
            if event.result.status() == MirrorStatus::Failed {
                bar.set_message(format!(
                    "last failure: {}",
                    event.result.repository().path_with_namespace
                ));
            }
            if event.bucket_progress.is_done() {
                bar.finish();
            }
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.overall.lock().expect("mutex poisoned").as_ref() {
            bar.finish();
        }
        for bar in self.buckets.lock().expect("mutex poisoned").values() {
            if !bar.is_finished() {
                bar.finish();
            }
        }
    }
}
