//! In-memory metrics for git commands and GitLab API calls.
//!
//! A run records one entry per clone/fetch and per API page. The binary
//! logs [`MetricsSnapshot::format_report`] at debug level when a run ends.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// Global metrics instance.
pub static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Centralized metrics collection.
pub struct Metrics {
    git: Mutex<BTreeMap<String, CallMetrics>>,
    api: Mutex<BTreeMap<String, CallMetrics>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            git: Mutex::new(BTreeMap::new()),
            api: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record a git command (`clone`, `fetch`, ...).
    pub fn record_git(&self, operation: &str, duration: Duration, success: bool) {
        let mut git = self.git.lock().expect("mutex poisoned");
        git.entry(operation.to_string())
            .or_default()
            .record(duration, success);
    }

    /// Record a hosting API request.
    pub fn record_api(&self, endpoint: &str, duration: Duration, success: bool) {
        let mut api = self.api.lock().expect("mutex poisoned");
        api.entry(endpoint.to_string())
            .or_default()
            .record(duration, success);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            git: self.git.lock().expect("mutex poisoned").clone(),
            api: self.api.lock().expect("mutex poisoned").clone(),
        }
    }

    pub fn reset(&self) {
        self.git.lock().expect("mutex poisoned").clear();
        self.api.lock().expect("mutex poisoned").clear();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters and latency samples for one kind of call.
#[derive(Debug, Clone, Default)]
pub struct CallMetrics {
    pub invocations: u64,
    pub failures: u64,
    pub total_duration: Duration,
    pub max_duration: Duration,
    samples: Vec<Duration>,
}

impl CallMetrics {
    pub fn record(&mut self, duration: Duration, success: bool) {
        self.invocations += 1;
        if !success {
            self.failures += 1;
        }
        self.total_duration += duration;
        self.max_duration = self.max_duration.max(duration);
        self.samples.push(duration);
    }

    pub fn avg_duration(&self) -> Duration {
        if self.invocations == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.invocations as u32
        }
    }

    /// Nearest-rank percentile of recorded durations.
    pub fn percentile(&self, p: u8) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort();
        let index = (p as f64 / 100.0 * (sorted.len() - 1) as f64).round() as usize;
        Some(sorted[index.min(sorted.len() - 1)])
    }
}

/// Point-in-time copy of all metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub git: BTreeMap<String, CallMetrics>,
    pub api: BTreeMap<String, CallMetrics>,
}

impl MetricsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.git.is_empty() && self.api.is_empty()
    }

    /// Human-readable report, one line per call kind.
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        for (section, entries) in [("git", &self.git), ("api", &self.api)] {
            for (name, m) in entries {
                report.push_str(&format!(
                    "{} {}: {} calls, {} failed, avg {:.0}ms, p95 {:.0}ms, max {:.0}ms\n",
                    section,
                    name,
                    m.invocations,
                    m.failures,
                    m.avg_duration().as_secs_f64() * 1000.0,
                    m.percentile(95).unwrap_or_default().as_secs_f64() * 1000.0,
                    m.max_duration.as_secs_f64() * 1000.0
                ));
            }
        }
        report
    }
}
