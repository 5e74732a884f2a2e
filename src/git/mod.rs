//! Git operations wrapper
//!
//! Repository inspection goes through git2 (libgit2 bindings). Network
//! operations shell out to the `git` CLI, which handles `--mirror` clones and
//! credential-bearing URLs the same way a user's git would.

pub mod remote;

pub use remote::*;

use crate::util::log_cmd;
use git2::Repository;
use std::path::Path;
use std::process::{Command, Output};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Remote configuration failed: {0}")]
    RemoteConfig(String),
}

/// Settings applied to every git network operation.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Abort a transfer that stalls for longer than this
    pub timeout: Duration,
    /// Verify TLS certificates (`http.sslVerify`)
    pub verify_tls: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            verify_tls: true,
        }
    }
}

impl TransportOptions {
    /// `-c key=value` pairs for git invocations.
    pub fn config_args(&self) -> Vec<String> {
        let secs = self.timeout.as_secs().max(1);
        let mut args = vec![
            "-c".to_string(),
            "http.lowSpeedLimit=1".to_string(),
            "-c".to_string(),
            format!("http.lowSpeedTime={}", secs),
        ];
        if !self.verify_tls {
            args.push("-c".to_string());
            args.push("http.sslVerify=false".to_string());
        }
        args
    }
}

/// Open a git repository at the given path (bare or not, no parent search)
pub fn open_repo<P: AsRef<Path>>(path: P) -> Result<Repository, GitError> {
    Repository::open(path.as_ref())
        .map_err(|e| GitError::NotARepo(format!("{}: {}", path.as_ref().display(), e)))
}

/// Check if a path is a git repository
pub fn is_git_repo<P: AsRef<Path>>(path: P) -> bool {
    Repository::open(path.as_ref()).is_ok()
}

/// Check if a path exists (without following a dangling symlink to "absent")
pub fn path_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().symlink_metadata().is_ok()
}

/// Build a `git` command that never prompts for credentials.
pub(crate) fn git_command(transport: Option<&TransportOptions>) -> Command {
    let mut cmd = Command::new("git");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    if let Some(opts) = transport {
        cmd.args(opts.config_args());
    }
    cmd
}

/// Run a prepared git command, turning a non-zero exit into
/// [`GitError::CommandFailed`]. `scrub` is applied to stderr before it is
/// stored in the error.
pub(crate) fn run_git(
    mut cmd: Command,
    command: &str,
    scrub: impl Fn(&str) -> String,
) -> Result<Output, GitError> {
    log_cmd(&cmd);
    let output = cmd.output().map_err(|e| GitError::CommandFailed {
        command: command.to_string(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed {
            command: command.to_string(),
            stderr: scrub(stderr.trim()),
        });
    }

    Ok(output)
}
