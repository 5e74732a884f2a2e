//! Destination paths for bare mirrors

use std::path::{Component, Path, PathBuf};

/// Map a namespaced repository path to its mirror location:
/// `<backup_root>/<path_with_namespace>.git`, absolute and normalized.
///
/// The deepest existing ancestor is canonicalized so symlinks in the backup
/// root resolve; the remainder (which may not exist yet) is appended as is.
pub fn repo_destination(backup_root: &Path, path_with_namespace: &str) -> PathBuf {
    let relative = format!("{}.git", path_with_namespace.trim_matches('/'));
    let joined = backup_root.join(relative);
    let absolute = std::path::absolute(&joined).unwrap_or(joined);
    resolve(&normalize(&absolute))
}

/// Lexically drop `.` components and fold `..` into their parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn resolve(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return tail
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
