//! Hosting platform trait definition

use async_trait::async_trait;
use thiserror::Error;

use crate::mirror::RepositoryDescriptor;

/// Errors that can occur while discovering repositories. All of them abort
/// a run before any mirroring starts.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Source of the repositories to mirror.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Every repository under `group_path`, subgroups and archived projects
    /// included, deduplicated by id and sorted by namespaced path.
    async fn discover(&self, group_path: &str) -> Result<Vec<RepositoryDescriptor>, PlatformError>;
}
