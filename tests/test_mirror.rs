//! Mirror engine tests against real local remotes.

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use common::git_helpers;
use glbak::git::TransportOptions;
use glbak::mirror::{
    mirror_repository, repo_destination, GitMirrorer, MirrorJob, Orchestrator, RunOptions,
    SecretUrl,
};
use glbak::{MirrorStatus, RepositoryDescriptor, RunSummary};

fn descriptor(id: u64, path: &str, url: &str) -> RepositoryDescriptor {
    RepositoryDescriptor::new(id, path, url, false)
}

fn job_for(backup_root: &Path, repo: &RepositoryDescriptor, dry_run: bool) -> MirrorJob {
    MirrorJob {
        repository: repo.clone(),
        destination: repo_destination(backup_root, &repo.path_with_namespace),
        remote: SecretUrl::new(repo.http_url_to_repo.clone()),
        dry_run,
    }
}

fn run_options(backup_root: &Path, concurrency: usize) -> RunOptions {
    RunOptions {
        backup_root: backup_root.to_path_buf(),
        token: String::new(),
        concurrency,
        dry_run: false,
        group_root: "acme".to_string(),
    }
}

#[test]
fn test_second_run_updates_existing_mirror() {
    let temp = TempDir::new().unwrap();
    let remote = git_helpers::seed_remote(temp.path(), "api");
    let backups = temp.path().join("backups");
    let repo = descriptor(1, "acme/api", &remote.url);
    let transport = TransportOptions::default();

    let first = mirror_repository(&job_for(&backups, &repo, false), &transport, "");
    assert_eq!(first.status(), MirrorStatus::Cloned, "{}", first.message());

    let dest = first.destination().clone();
    assert!(dest.ends_with("acme/api.git"));
    assert!(git_helpers::is_bare(&dest));
    assert_eq!(
        git_helpers::rev_parse(&dest, "refs/tags/v1.0"),
        git_helpers::get_head_sha(&remote.work)
    );

    // New commit, new branch and new tag upstream
    let new_sha =
        git_helpers::commit_file(&remote.work, "CHANGELOG.md", "v1.1\n", "Add changelog");
    git_helpers::create_tag(&remote.work, "v1.1");
    git_helpers::create_branch(&remote.work, "feature");
    git_helpers::push_all(&remote.work, "origin");

    let second = mirror_repository(&job_for(&backups, &repo, false), &transport, "");
    assert_eq!(second.status(), MirrorStatus::Updated, "{}", second.message());
    assert_eq!(git_helpers::rev_parse(&dest, "refs/heads/main"), new_sha);
    assert_eq!(git_helpers::rev_parse(&dest, "refs/tags/v1.1"), new_sha);
    assert!(git_helpers::ref_names(&dest).contains(&"refs/heads/feature".to_string()));
}

#[test]
fn test_update_prunes_deleted_branches() {
    let temp = TempDir::new().unwrap();
    let remote = git_helpers::seed_remote(temp.path(), "web");
    git_helpers::create_branch(&remote.work, "topic");
    git_helpers::push_all(&remote.work, "origin");

    let backups = temp.path().join("backups");
    let repo = descriptor(2, "acme/web", &remote.url);
    let transport = TransportOptions::default();

    let first = mirror_repository(&job_for(&backups, &repo, false), &transport, "");
    assert_eq!(first.status(), MirrorStatus::Cloned, "{}", first.message());
    assert!(git_helpers::ref_names(first.destination()).contains(&"refs/heads/topic".to_string()));

    git_helpers::delete_remote_branch(&remote.work, "origin", "topic");

    let second = mirror_repository(&job_for(&backups, &repo, false), &transport, "");
    assert_eq!(second.status(), MirrorStatus::Updated, "{}", second.message());
    assert!(!git_helpers::ref_names(second.destination())
        .contains(&"refs/heads/topic".to_string()));
}

#[test]
fn test_stray_directory_is_replaced_by_clone() {
    let temp = TempDir::new().unwrap();
    let remote = git_helpers::seed_remote(temp.path(), "data");
    let backups = temp.path().join("backups");
    let repo = descriptor(3, "acme/data", &remote.url);

    let dest = repo_destination(&backups, "acme/data");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("stray.txt"), "not a repository").unwrap();

    let result = mirror_repository(
        &job_for(&backups, &repo, false),
        &TransportOptions::default(),
        "",
    );
    assert_eq!(result.status(), MirrorStatus::Cloned, "{}", result.message());
    assert!(!dest.join("stray.txt").exists());
    assert!(git_helpers::is_bare(&dest));
}

#[test]
fn test_stray_file_is_replaced_by_clone() {
    let temp = TempDir::new().unwrap();
    let remote = git_helpers::seed_remote(temp.path(), "docs");
    let backups = temp.path().join("backups");
    let repo = descriptor(4, "acme/docs", &remote.url);

    let dest = repo_destination(&backups, "acme/docs");
    fs::create_dir_all(dest.parent().unwrap()).unwrap();
    fs::write(&dest, "a plain file").unwrap();

    let result = mirror_repository(
        &job_for(&backups, &repo, false),
        &TransportOptions::default(),
        "",
    );
    assert_eq!(result.status(), MirrorStatus::Cloned, "{}", result.message());
    assert!(dest.is_dir());
}

#[test]
fn test_update_rewrites_origin_url() {
    let temp = TempDir::new().unwrap();
    let remote = git_helpers::seed_remote(temp.path(), "svc");
    let backups = temp.path().join("backups");
    let transport = TransportOptions::default();

    let first = mirror_repository(
        &job_for(&backups, &descriptor(5, "acme/svc", &remote.url), false),
        &transport,
        "",
    );
    assert_eq!(first.status(), MirrorStatus::Cloned, "{}", first.message());

    // The project moved to another location upstream
    let moved = temp.path().join("moved").join("svc.git");
    fs::create_dir_all(moved.parent().unwrap()).unwrap();
    fs::rename(&remote.bare, &moved).unwrap();
    let moved_url = git_helpers::file_url(&moved);

    let second = mirror_repository(
        &job_for(&backups, &descriptor(5, "acme/svc", &moved_url), false),
        &transport,
        "",
    );
    assert_eq!(second.status(), MirrorStatus::Updated, "{}", second.message());
    assert_eq!(git_helpers::origin_url(second.destination()), moved_url);
}

#[test]
fn test_dry_run_leaves_disk_untouched() {
    let temp = TempDir::new().unwrap();
    let remote = git_helpers::seed_remote(temp.path(), "cli");
    let backups = temp.path().join("backups");
    let repo = descriptor(6, "acme/cli", &remote.url);

    let result = mirror_repository(
        &job_for(&backups, &repo, true),
        &TransportOptions::default(),
        "",
    );
    assert_eq!(result.status(), MirrorStatus::Skipped);
    assert_eq!(result.message(), "dry-run");
    assert!(!backups.exists());
}

#[tokio::test]
async fn test_run_isolates_failures() {
    let temp = TempDir::new().unwrap();
    let good = git_helpers::seed_remote(temp.path(), "good");
    let missing = git_helpers::file_url(&temp.path().join("remotes").join("missing.git"));
    let backups = temp.path().join("backups");

    let repos = vec![
        descriptor(1, "acme/good", &good.url),
        descriptor(2, "acme/team/missing", &missing),
    ];

    let orchestrator = Orchestrator::new(Arc::new(GitMirrorer::new(
        TransportOptions::default(),
        String::new(),
    )));
    let results = orchestrator.run(&repos, &run_options(&backups, 2)).await;
    assert_eq!(results.len(), 2);

    let summary = RunSummary::from_results(&results);
    assert_eq!(summary.count(MirrorStatus::Cloned), 1);
    assert_eq!(summary.count(MirrorStatus::Failed), 1);
    assert_eq!(
        summary.failures[0].repository().path_with_namespace,
        "acme/team/missing"
    );
    assert!(!summary.failures[0].message().is_empty());

    assert!(git_helpers::is_bare(&backups.join("acme").join("good.git")));
    assert!(!backups.join("acme").join("team").join("missing.git").exists());
}

#[tokio::test]
async fn test_run_mirrors_many_repositories() {
    let temp = TempDir::new().unwrap();
    let backups = temp.path().join("backups");

    let repos: Vec<RepositoryDescriptor> = ["api", "web", "infra/ci", "infra/ops", "tools"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let remote = git_helpers::seed_remote(temp.path(), &name.replace('/', "-"));
            descriptor(i as u64 + 1, &format!("acme/{}", name), &remote.url)
        })
        .collect();

    let orchestrator = Orchestrator::new(Arc::new(GitMirrorer::new(
        TransportOptions::default(),
        String::new(),
    )));

    let first = orchestrator.run(&repos, &run_options(&backups, 3)).await;
    let summary = RunSummary::from_results(&first);
    assert_eq!(summary.count(MirrorStatus::Cloned), 5);
    assert!(!summary.has_failures());

    let second = orchestrator.run(&repos, &run_options(&backups, 1)).await;
    let summary = RunSummary::from_results(&second);
    assert_eq!(summary.count(MirrorStatus::Updated), 5);
    assert!(backups.join("acme/infra/ops.git").is_dir());
}
