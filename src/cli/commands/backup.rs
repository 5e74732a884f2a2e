//! Backup command implementation
//!
//! Discovers every project of a GitLab group and mirrors it below the
//! destination directory.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::output::Output;
use crate::cli::progress::TerminalProgress;
use crate::core::Settings;
use crate::mirror::{
    GitMirrorer, Mirrorer, NoopProgress, Orchestrator, ProgressReporter, RunSummary,
};
use crate::platform::{GitLabClient, ProjectSource};

/// How a backup run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Every repository was mirrored (or there was nothing to do)
    Success,
    /// At least one repository failed
    PartialFailure,
}

impl BackupOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            BackupOutcome::Success => 0,
            BackupOutcome::PartialFailure => 2,
        }
    }
}

/// Run a backup against the configured GitLab instance.
pub async fn run_backup(settings: &Settings) -> Result<BackupOutcome> {
    let client = GitLabClient::new(
        &settings.base_url,
        settings.token(),
        settings.timeout,
        settings.verify_ssl,
    )?;
    let mirrorer = Arc::new(GitMirrorer::new(
        settings.transport(),
        settings.token().to_string(),
    ));

    execute_backup(settings, &client, mirrorer).await
}

/// Discovery, mirroring and reporting with injectable collaborators.
pub async fn execute_backup(
    settings: &Settings,
    source: &dyn ProjectSource,
    mirrorer: Arc<dyn Mirrorer>,
) -> Result<BackupOutcome> {
    if !settings.json {
        Output::header(&format!("glbak v{}", env!("CARGO_PKG_VERSION")));
        Output::kv("GitLab", &settings.base_url);
        Output::kv("Group", &settings.group_path);
        Output::kv("Destination", &settings.dest.display().to_string());
        if settings.dry_run {
            Output::warning("Dry run: nothing will be cloned or fetched");
        }
    }

    let projects = source
        .discover(&settings.group_path)
        .await
        .with_context(|| format!("Failed to list projects of '{}'", settings.group_path))?;

    if projects.is_empty() {
        if settings.json {
            let summary = RunSummary::from_results(&[]);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            Output::info("No projects found. Check the group path and token permissions.");
        }
        return Ok(BackupOutcome::Success);
    }

    if !settings.json {
        Output::info(&format!("Discovered projects: {}", projects.len()));
    }
    info!(count = projects.len(), group = %settings.group_path, "Discovered projects");

    if !settings.dry_run {
        std::fs::create_dir_all(&settings.dest).with_context(|| {
            format!(
                "Failed to create destination directory {}",
                settings.dest.display()
            )
        })?;
    }

    let progress: Arc<dyn ProgressReporter> = if settings.json {
        Arc::new(NoopProgress)
    } else {
        Arc::new(TerminalProgress::new())
    };
    let orchestrator = Orchestrator::new(mirrorer).with_progress(progress);
    let results = orchestrator.run(&projects, &settings.run_options()).await;
    let summary = RunSummary::from_results(&results);

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        Output::summary(&summary);
        if !summary.has_failures() {
            Output::success(&format!("Mirrored {} repositories", summary.total));
        }
    }

    #[cfg(feature = "telemetry")]
    {
        let snapshot = crate::telemetry::GLOBAL_METRICS.snapshot();
        if !snapshot.is_empty() {
            debug!("run metrics:\n{}", snapshot.format_report());
        }
    }
    debug!(total = summary.total, failed = summary.failed_total, "Backup finished");

    Ok(if summary.has_failures() {
        BackupOutcome::PartialFailure
    } else {
        BackupOutcome::Success
    })
}
