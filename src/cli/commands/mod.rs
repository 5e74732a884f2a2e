//! CLI command implementations

pub mod backup;

pub use backup::{execute_backup, run_backup, BackupOutcome};
