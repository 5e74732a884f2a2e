//! Git helper utilities for integration tests.
//!
//! Builds bare "remote" repositories on disk with the `git` CLI so mirror
//! runs can be exercised offline over `file://` URLs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A bare remote plus the working clone used to push into it.
pub struct SeededRemote {
    pub bare: PathBuf,
    pub work: PathBuf,
    pub url: String,
}

/// Create `<root>/remotes/<name>.git` with one commit on `main` and a `v1.0`
/// tag.
pub fn seed_remote(root: &Path, name: &str) -> SeededRemote {
    let bare = root.join("remotes").join(format!("{}.git", name));
    let work = root.join("work").join(name);

    init_bare_repo(&bare);
    init_repo(&work);
    commit_file(&work, "README.md", &format!("# {}\n", name), "Initial commit");
    create_tag(&work, "v1.0");

    let url = file_url(&bare);
    add_remote(&work, "origin", &url);
    push_all(&work, "origin");

    SeededRemote { bare, work, url }
}

/// `file://` URL for a local path.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Initialize a bare git repository at the given path.
pub fn init_bare_repo(path: &Path) {
    fs::create_dir_all(path).unwrap();
    let status = Command::new("git")
        .args(["init", "--bare", "-b", "main"])
        .current_dir(path)
        .output()
        .expect("failed to init bare repo");
    assert!(
        status.status.success(),
        "git init --bare failed: {}",
        String::from_utf8_lossy(&status.stderr)
    );
}

/// Initialize a non-bare git repository with user config.
pub fn init_repo(path: &Path) {
    fs::create_dir_all(path).unwrap();
    git(path, &["init", "-b", "main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
}

/// Create a file, stage, and commit it. Returns the commit hash.
pub fn commit_file(repo_path: &Path, filename: &str, content: &str, message: &str) -> String {
    fs::write(repo_path.join(filename), content).unwrap();
    git(repo_path, &["add", filename]);
    git(repo_path, &["commit", "-m", message]);
    get_head_sha(repo_path)
}

/// Create and checkout a new branch.
pub fn create_branch(repo_path: &Path, branch_name: &str) {
    git(repo_path, &["checkout", "-b", branch_name]);
}

pub fn create_tag(repo_path: &Path, tag: &str) {
    git(repo_path, &["tag", tag]);
}

/// Add a remote to a repository.
pub fn add_remote(repo_path: &Path, name: &str, url: &str) {
    git(repo_path, &["remote", "add", name, url]);
}

/// Push every branch and tag.
pub fn push_all(repo_path: &Path, remote: &str) {
    git(repo_path, &["push", remote, "--all"]);
    git(repo_path, &["push", remote, "--tags"]);
}

/// Delete a branch on the remote.
pub fn delete_remote_branch(repo_path: &Path, remote: &str, branch: &str) {
    git(repo_path, &["push", remote, "--delete", branch]);
}

/// Get HEAD sha.
pub fn get_head_sha(repo_path: &Path) -> String {
    git_output(repo_path, &["rev-parse", "HEAD"])
}

/// Resolve a ref in any repository (bare or not).
pub fn rev_parse(repo_path: &Path, rev: &str) -> String {
    git_output(repo_path, &["rev-parse", rev])
}

/// All ref names of a repository, sorted.
pub fn ref_names(repo_path: &Path) -> Vec<String> {
    let out = git_output(repo_path, &["for-each-ref", "--format=%(refname)"]);
    let mut refs: Vec<String> = out.lines().map(str::to_string).collect();
    refs.sort();
    refs
}

/// Configured URL of `origin`.
pub fn origin_url(repo_path: &Path) -> String {
    git_output(repo_path, &["config", "--get", "remote.origin.url"])
}

/// Whether the path is a bare repository.
pub fn is_bare(repo_path: &Path) -> bool {
    git_output(repo_path, &["rev-parse", "--is-bare-repository"]) == "true"
}

/// Run a git command, panic on failure.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run git {:?}: {}", args, e));
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run a git command and return trimmed stdout.
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run git {:?}: {}", args, e));
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
