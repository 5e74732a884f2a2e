//! CLI layer
//!
//! Command implementation, terminal progress and output helpers.

pub mod commands;
pub mod output;
pub mod progress;

pub use output::Output;
pub use progress::TerminalProgress;
