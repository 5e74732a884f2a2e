//! Command logging utilities for verbose output.

use std::process::Command;
use tracing::debug;

use crate::mirror::credentials::redact_url;

/// Command arguments with any URL password replaced by `***`.
pub fn redacted_args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| redact_url(&a.to_string_lossy()))
        .collect()
}

/// Log a command just before execution.
///
/// Emits a `tracing::debug!` event with the program name, arguments, and
/// working directory. Credentials embedded in URL arguments are redacted.
/// Visible when running with `--verbose` (which sets `glbak=debug`) or via
/// `RUST_LOG=glbak::cmd=debug`.
pub fn log_cmd(cmd: &Command) {
    let program = cmd.get_program().to_string_lossy();
    let args = redacted_args(cmd);
    let cwd = cmd
        .get_current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    debug!(
        target: "glbak::cmd",
        %program,
        ?args,
        %cwd,
        "exec"
    );
}
