//! Git remote operations for bare mirrors

use git2::{ErrorClass, ErrorCode, Repository};
use std::path::Path;

use super::{git_command, run_git, GitError, TransportOptions};
use crate::mirror::SecretUrl;

#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;
#[cfg(feature = "telemetry")]
use std::time::Instant;
#[cfg(feature = "telemetry")]
use tracing::debug;

/// Name of the remote every mirror fetches from
pub const ORIGIN: &str = "origin";

/// Record a git network operation in the global metrics.
#[cfg(feature = "telemetry")]
fn record(operation: &str, start: Instant, success: bool) {
    let duration = start.elapsed();
    GLOBAL_METRICS.record_git(operation, duration, success);
    debug!(
        operation,
        success,
        duration_ms = duration.as_millis() as u64,
        "Git operation complete"
    );
}

/// `git clone --mirror <url> <dest>`: all refs, bare, no working tree.
pub fn clone_mirror(
    url: &SecretUrl,
    dest: &Path,
    transport: &TransportOptions,
    scrub: impl Fn(&str) -> String,
) -> Result<(), GitError> {
    #[cfg(feature = "telemetry")]
    let start = Instant::now();

    let mut cmd = git_command(Some(transport));
    cmd.args(["clone", "--mirror", "--"])
        .arg(url.expose())
        .arg(dest);
    let result = run_git(cmd, "clone", scrub).map(|_| ());

    #[cfg(feature = "telemetry")]
    record("clone", start, result.is_ok());

    result
}

/// Fetch every ref, pruning branches and tags deleted on the remote.
pub fn fetch_mirror(
    dest: &Path,
    transport: &TransportOptions,
    scrub: impl Fn(&str) -> String,
) -> Result<(), GitError> {
    #[cfg(feature = "telemetry")]
    let start = Instant::now();

    let mut cmd = git_command(Some(transport));
    cmd.args(["fetch", "--prune", "--prune-tags", "--all", "--tags", "--force"])
        .current_dir(dest);
    let result = run_git(cmd, "fetch", scrub).map(|_| ());

    #[cfg(feature = "telemetry")]
    record("fetch", start, result.is_ok());

    result
}

/// Whether a libgit2 failure is a remote-configuration problem that the
/// `git remote set-url` fallback can plausibly fix.
fn is_remote_config_error(err: &git2::Error) -> bool {
    matches!(err.class(), ErrorClass::Config)
        || matches!(err.code(), ErrorCode::Locked | ErrorCode::NotFound)
}

/// Point `origin` at `url`.
///
/// Tries libgit2 first. Remote-configuration failures fall back to
/// `git remote set-url`; any other libgit2 error is returned as is.
pub fn set_origin_url(
    repo: &Repository,
    url: &SecretUrl,
    scrub: impl Fn(&str) -> String,
) -> Result<(), GitError> {
    let err = match repo.remote_set_url(ORIGIN, url.expose()) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    if !is_remote_config_error(&err) {
        return Err(GitError::Git(err));
    }

    tracing::debug!(
        path = %repo.path().display(),
        error = %err.message(),
        "libgit2 could not set remote url, retrying with git CLI"
    );

    let mut cmd = git_command(None);
    cmd.args(["remote", "set-url", ORIGIN])
        .arg(url.expose())
        .current_dir(repo.path());
    run_git(cmd, "remote set-url", &scrub)
        .map(|_| ())
        .map_err(|fallback| {
            GitError::RemoteConfig(format!("{}; fallback: {}", scrub(err.message()), fallback))
        })
}

/// Get the configured URL of a remote, if any
pub fn get_remote_url(repo: &Repository, remote: &str) -> Result<Option<String>, GitError> {
    match repo.find_remote(remote) {
        Ok(r) => Ok(r.url().map(|u| u.to_string())),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(GitError::Git(e)),
    }
}
