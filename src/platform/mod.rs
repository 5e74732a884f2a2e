//! Hosting platform adapters
//!
//! Discovery of the repositories to mirror. Only GitLab is supported.

pub mod gitlab;
pub mod traits;

pub use gitlab::GitLabClient;
pub use traits::{PlatformError, ProjectSource};
