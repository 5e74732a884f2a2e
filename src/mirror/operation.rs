//! Per-repository mirror operation
//!
//! ```text
//! dry-run ──────────────────────────────────────────► skipped
//! not-present ─────────────── clone --mirror ───────► cloned | failed (partial removed)
//! present-invalid ── remove ── clone --mirror ──────► cloned | failed
//! present-valid ── set origin url ── fetch --prune ─► updated | failed (mirror kept)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "telemetry")]
use tracing::instrument;
use tracing::{debug, warn};

use super::credentials::redact_secret;
use super::{MirrorError, MirrorResult, RepositoryDescriptor, SecretUrl};
use crate::git::{
    clone_mirror, fetch_mirror, open_repo, path_exists, set_origin_url, TransportOptions,
};

/// Everything needed to mirror one repository.
#[derive(Debug, Clone)]
pub struct MirrorJob {
    pub repository: RepositoryDescriptor,
    pub destination: PathBuf,
    pub remote: SecretUrl,
    pub dry_run: bool,
}

/// Runs the mirror operation for one job.
///
/// Implementations must not panic for ordinary failures; every job yields a
/// [`MirrorResult`].
pub trait Mirrorer: Send + Sync {
    fn mirror(&self, job: &MirrorJob) -> MirrorResult;
}

/// The real mirrorer: git CLI for transport, libgit2 for inspection.
#[derive(Debug, Clone, Default)]
pub struct GitMirrorer {
    transport: TransportOptions,
    token: String,
}

impl GitMirrorer {
    /// `token` is only used to scrub error output; credentials travel in the
    /// job's remote URL.
    pub fn new(transport: TransportOptions, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
        }
    }
}

impl Mirrorer for GitMirrorer {
    fn mirror(&self, job: &MirrorJob) -> MirrorResult {
        mirror_repository(job, &self.transport, &self.token)
    }
}

/// Clone, repair or update the mirror described by `job`.
#[cfg_attr(
    feature = "telemetry",
    instrument(
        skip_all,
        fields(repo = %job.repository.path_with_namespace, dest = %job.destination.display())
    )
)]
pub fn mirror_repository(
    job: &MirrorJob,
    transport: &TransportOptions,
    token: &str,
) -> MirrorResult {
    let repository = job.repository.clone();
    let destination = job.destination.clone();

    if job.dry_run {
        return MirrorResult::skipped(repository, destination, "dry-run");
    }

    match run(job, transport, token) {
        Ok(Completed::Cloned) => MirrorResult::cloned(repository, destination),
        Ok(Completed::Updated) => MirrorResult::updated(repository, destination),
        Err(err) => {
            debug!(error = %err, "mirror operation failed");
            MirrorResult::failed(repository, destination, err.to_string())
        }
    }
}

enum Completed {
    Cloned,
    Updated,
}

fn run(
    job: &MirrorJob,
    transport: &TransportOptions,
    token: &str,
) -> Result<Completed, MirrorError> {
    let dest = job.destination.as_path();
    let scrub = |text: &str| redact_secret(text, token);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MirrorError::Filesystem(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }

    if !path_exists(dest) {
        debug!(url = %job.repository.http_url_to_repo, "cloning new mirror");
        return clone_fresh(job, transport, &scrub);
    }

    let repo = match open_repo(dest) {
        Ok(repo) => repo,
        Err(e) => {
            warn!(
                dest = %dest.display(),
                error = %e,
                "destination is not a repository, replacing it"
            );
            remove_destination(dest)?;
            return clone_fresh(job, transport, &scrub);
        }
    };

    debug!(url = %job.repository.http_url_to_repo, "updating existing mirror");
    set_origin_url(&repo, &job.remote, &scrub)?;
    fetch_mirror(dest, transport, &scrub)?;
    Ok(Completed::Updated)
}

fn clone_fresh(
    job: &MirrorJob,
    transport: &TransportOptions,
    scrub: &impl Fn(&str) -> String,
) -> Result<Completed, MirrorError> {
    let dest = job.destination.as_path();
    match clone_mirror(&job.remote, dest, transport, scrub) {
        Ok(()) => Ok(Completed::Cloned),
        Err(e) => {
            if path_exists(dest) {
                if let Err(cleanup) = remove_destination(dest) {
                    warn!(
                        dest = %dest.display(),
                        error = %cleanup,
                        "could not remove partial clone"
                    );
                }
            }
            Err(e.into())
        }
    }
}

/// Remove whatever sits at `dest`: a directory tree, a file or a symlink.
fn remove_destination(dest: &Path) -> Result<(), MirrorError> {
    let meta = fs::symlink_metadata(dest).map_err(|e| {
        MirrorError::Filesystem(format!("cannot stat {}: {}", dest.display(), e))
    })?;

    let removed = if meta.is_dir() {
        fs::remove_dir_all(dest)
    } else {
        fs::remove_file(dest)
    };
    removed.map_err(|e| {
        MirrorError::Filesystem(format!("cannot remove {}: {}", dest.display(), e))
    })
}
