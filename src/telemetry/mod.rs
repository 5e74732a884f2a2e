//! Logging and metrics for glbak.
//!
//! - Structured logging via the `tracing` crate
//! - Metrics for git commands and GitLab API calls
//!
//! # Feature Flags
//!
//! - `telemetry` (default): spans around mirror operations and metrics recording
//! - `release-logs`: Strip debug/trace at compile time
//! - `max-perf`: Disable all tracing for maximum performance

mod init;
pub mod metrics;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
pub use metrics::{CallMetrics, Metrics, MetricsSnapshot, GLOBAL_METRICS};
