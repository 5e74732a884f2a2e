//! Mirror engine
//!
//! Decides per repository whether to clone or update, runs the work under
//! bounded parallelism and aggregates the outcomes into a run summary.

pub mod bucket;
pub mod credentials;
pub mod destination;
pub mod operation;
pub mod orchestrator;
pub mod progress;
pub mod summary;

pub use bucket::{bucket_for, partition, Bucket, ROOT_BUCKET};
pub use credentials::{embed_token, redact_secret, SecretUrl};
pub use destination::repo_destination;
pub use operation::{mirror_repository, GitMirrorer, MirrorJob, Mirrorer};
pub use orchestrator::{Orchestrator, RunOptions};
pub use progress::{NoopProgress, ProgressCounter, ProgressEvent, ProgressReporter};
pub use summary::{truncate_message, RunSummary, FAILURE_DISPLAY_CAP, MESSAGE_DISPLAY_LEN};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::git::GitError;

/// A remote repository as reported by the hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    /// Platform-wide unique project id
    pub id: u64,
    /// Namespaced path, e.g. `group/subgroup/project`
    pub path_with_namespace: String,
    /// Plain (credential-free) HTTP(S) clone URL
    pub http_url_to_repo: String,
    /// Whether the project is archived on the platform
    pub archived: bool,
}

impl RepositoryDescriptor {
    pub fn new(
        id: u64,
        path_with_namespace: impl Into<String>,
        http_url_to_repo: impl Into<String>,
        archived: bool,
    ) -> Self {
        Self {
            id,
            path_with_namespace: path_with_namespace.into(),
            http_url_to_repo: http_url_to_repo.into(),
            archived,
        }
    }
}

/// Terminal outcome of mirroring one repository.
///
/// Variants are declared in name order so that `Ord` sorts by status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorStatus {
    Cloned,
    Failed,
    Skipped,
    Updated,
}

impl MirrorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MirrorStatus::Cloned => "cloned",
            MirrorStatus::Failed => "failed",
            MirrorStatus::Skipped => "skipped",
            MirrorStatus::Updated => "updated",
        }
    }
}

impl fmt::Display for MirrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one mirror operation. Created once per repository per run.
#[derive(Debug, Clone, Serialize)]
pub struct MirrorResult {
    repository: RepositoryDescriptor,
    destination: PathBuf,
    status: MirrorStatus,
    message: String,
}

impl MirrorResult {
    fn new(
        repository: RepositoryDescriptor,
        destination: PathBuf,
        status: MirrorStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            destination,
            status,
            message: message.into(),
        }
    }

    pub fn cloned(repository: RepositoryDescriptor, destination: PathBuf) -> Self {
        Self::new(repository, destination, MirrorStatus::Cloned, "clone ok")
    }

    pub fn updated(repository: RepositoryDescriptor, destination: PathBuf) -> Self {
        Self::new(repository, destination, MirrorStatus::Updated, "fetch ok")
    }

    pub fn skipped(
        repository: RepositoryDescriptor,
        destination: PathBuf,
        message: impl Into<String>,
    ) -> Self {
        Self::new(repository, destination, MirrorStatus::Skipped, message)
    }

    pub fn failed(
        repository: RepositoryDescriptor,
        destination: PathBuf,
        message: impl Into<String>,
    ) -> Self {
        Self::new(repository, destination, MirrorStatus::Failed, message)
    }

    pub fn repository(&self) -> &RepositoryDescriptor {
        &self.repository
    }

    pub fn destination(&self) -> &PathBuf {
        &self.destination
    }

    pub fn status(&self) -> MirrorStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_failure(&self) -> bool {
        self.status == MirrorStatus::Failed
    }
}

/// Per-repository failures. Never fatal to a run.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Clone, fetch or remote configuration failed (network, auth, missing remote)
    #[error("{0}")]
    Transport(String),

    /// Destination could not be created or removed
    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl From<GitError> for MirrorError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::Io(e) => MirrorError::Filesystem(e.to_string()),
            other => MirrorError::Transport(other.to_string()),
        }
    }
}
