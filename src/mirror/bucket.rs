//! Reporting buckets
//!
//! Repositories are grouped by their first path segment below the group
//! root. Buckets only drive progress display; they never affect scheduling.

use std::collections::HashMap;

use super::RepositoryDescriptor;

/// Bucket name for repositories sitting directly under the group root.
pub const ROOT_BUCKET: &str = "[root]";

/// A named cohort of repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub repositories: Vec<RepositoryDescriptor>,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Bucket name for a repository path relative to `group_root`.
pub fn bucket_for(path_with_namespace: &str, group_root: &str) -> String {
    let parts = segments(path_with_namespace);
    let root_parts = segments(group_root);

    let rest = if parts.starts_with(&root_parts) {
        &parts[root_parts.len()..]
    } else {
        // Not under the root; fall back to the full path.
        &parts[..]
    };

    if rest.len() <= 1 {
        ROOT_BUCKET.to_string()
    } else {
        rest[0].to_string()
    }
}

/// Group repositories into buckets.
///
/// Buckets are ordered by case-insensitive name; members keep input order.
pub fn partition(repositories: &[RepositoryDescriptor], group_root: &str) -> Vec<Bucket> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for repo in repositories {
        let name = bucket_for(&repo.path_with_namespace, group_root);
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            buckets.push(Bucket {
                name,
                repositories: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].repositories.push(repo.clone());
    }

    buckets.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    buckets
}
