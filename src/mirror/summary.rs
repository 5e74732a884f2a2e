//! Run summary aggregation

use serde::Serialize;
use std::collections::BTreeMap;

use super::{MirrorResult, MirrorStatus};

/// Maximum number of failures listed in a summary.
pub const FAILURE_DISPLAY_CAP: usize = 20;

/// Maximum characters of a failure message shown to the user.
pub const MESSAGE_DISPLAY_LEN: usize = 200;

/// Counts per status plus the (capped) list of failures.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub counts: BTreeMap<MirrorStatus, usize>,
    pub failed_total: usize,
    pub failures: Vec<MirrorResult>,
}

impl RunSummary {
    pub fn from_results(results: &[MirrorResult]) -> Self {
        let mut counts = BTreeMap::new();
        for result in results {
            *counts.entry(result.status()).or_insert(0) += 1;
        }

        let failed: Vec<&MirrorResult> = results.iter().filter(|r| r.is_failure()).collect();
        let failed_total = failed.len();
        let failures = failed
            .into_iter()
            .take(FAILURE_DISPLAY_CAP)
            .cloned()
            .collect();

        Self {
            total: results.len(),
            counts,
            failed_total,
            failures,
        }
    }

    pub fn count(&self, status: MirrorStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_total > 0
    }
}

/// Trim and cut a message to at most `max_chars` characters.
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    message.trim().chars().take(max_chars).collect()
}
