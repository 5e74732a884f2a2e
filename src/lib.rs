//! glbak - mirror every repository of a GitLab group into local bare
//! repositories.
//!
//! The [`mirror`] module holds the engine: credential embedding, destination
//! resolution, the per-repository clone/update state machine, bucketing,
//! bounded parallel orchestration and result aggregation. [`platform`]
//! discovers projects, [`core`] validates settings and [`cli`] presents a run.

pub mod cli;
pub mod core;
pub mod git;
pub mod mirror;
pub mod platform;
pub mod telemetry;
pub mod util;

pub use core::{ConfigError, Settings, SettingsArgs};
pub use mirror::{
    MirrorError, MirrorResult, MirrorStatus, Orchestrator, RepositoryDescriptor, RunOptions,
    RunSummary,
};
pub use platform::{GitLabClient, PlatformError, ProjectSource};
