//! CLI output formatting
//!
//! Colored status lines and summary formatting. Everything here writes to
//! stdout except [`Output::error`].

use colored::Colorize;
use indicatif::ProgressStyle;

use crate::mirror::{truncate_message, MirrorStatus, RunSummary, MESSAGE_DISPLAY_LEN};

/// Output helper for consistent CLI formatting
pub struct Output;

impl Output {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!("\n{}", message.bold());
    }

    /// Print a key-value pair
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", key.dimmed(), value);
    }

    /// Print a list item
    pub fn list_item(item: &str) {
        println!("  • {}", item);
    }

    /// Bar style shared by the overall and per-bucket bars
    pub fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:>24.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("hardcoded template must be valid")
            .progress_chars("█▓░")
    }

    /// Format a repo path consistently
    pub fn repo_name(name: &str) -> String {
        name.cyan().bold().to_string()
    }

    /// Color text by mirror status
    pub fn status(status: MirrorStatus, text: &str) -> String {
        match status {
            MirrorStatus::Cloned | MirrorStatus::Updated => text.green().to_string(),
            MirrorStatus::Skipped => text.yellow().to_string(),
            MirrorStatus::Failed => text.red().to_string(),
        }
    }

    /// Print per-status counts and the capped failure list.
    pub fn summary(summary: &RunSummary) {
        Output::header("Summary");
        for (status, line) in summary.counts.keys().zip(summary_lines(summary)) {
            println!("{}", Output::status(*status, &line));
        }

        if summary.has_failures() {
            Output::header(&format!("Failures ({})", summary.failed_total));
            for failure in &summary.failures {
                Output::list_item(&format!(
                    "{}: {}",
                    Output::repo_name(&failure.repository().path_with_namespace),
                    truncate_message(failure.message(), MESSAGE_DISPLAY_LEN)
                ));
            }
            let hidden = summary.failed_total - summary.failures.len();
            if hidden > 0 {
                Output::info(&format!("... and {} more", hidden));
            }
        }
    }
}

/// `{status:>8}: {count}` lines, one per status present in the run.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    summary
        .counts
        .iter()
        .map(|(status, count)| format!("{:>8}: {}", status.as_str(), count))
        .collect()
}
