//! GitLab platform adapter
//!
//! Resolves a group path and lists every project below it through the
//! GitLab REST API v4.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::traits::{PlatformError, ProjectSource};
use crate::mirror::RepositoryDescriptor;

#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;
#[cfg(feature = "telemetry")]
use std::time::Instant;

/// Page size used for project listings (GitLab's maximum)
const PER_PAGE: u32 = 100;

/// GitLab group response (only the fields we need)
#[derive(Debug, Deserialize)]
struct GitLabGroup {
    id: u64,
}

/// GitLab project response (`simple=true` representation)
#[derive(Debug, Deserialize)]
struct GitLabProject {
    id: u64,
    path_with_namespace: String,
    http_url_to_repo: String,
}

/// GitLab API client
pub struct GitLabClient {
    base_url: String,
    token: String,
    http_client: Client,
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GitLabClient {
    /// Create a client for `base_url` (e.g. `https://gitlab.com`).
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Duration,
        verify_tls: bool,
    ) -> Result<Self, PlatformError> {
        if token.is_empty() {
            return Err(PlatformError::AuthError(
                "GitLab API token is required".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .user_agent(concat!("glbak/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::NetworkError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http_client,
        })
    }

    /// Authenticated GET; non-success statuses become typed errors.
    async fn api_get(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        metric: &str,
    ) -> Result<Response, PlatformError> {
        let url = format!("{}/api/v4{}", self.base_url, endpoint);

        #[cfg(feature = "telemetry")]
        let start = Instant::now();

        let sent = self
            .http_client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(query)
            .send()
            .await;

        #[cfg(feature = "telemetry")]
        GLOBAL_METRICS.record_api(
            metric,
            start.elapsed(),
            matches!(&sent, Ok(r) if r.status().is_success()),
        );
        #[cfg(not(feature = "telemetry"))]
        let _ = metric;

        let response = sent.map_err(|e| PlatformError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PlatformError::AuthError(format!(
                "GitLab API error ({}): {}",
                status, error_text
            )),
            StatusCode::NOT_FOUND => PlatformError::NotFound(endpoint.to_string()),
            _ => PlatformError::ApiError(format!("GitLab API error ({}): {}", status, error_text)),
        })
    }

    /// Resolve a group id from its full path (e.g. `acme/legacy`).
    pub async fn get_group_id(&self, full_path: &str) -> Result<u64, PlatformError> {
        let encoded = urlencoding::encode(full_path.trim_matches('/')).into_owned();
        let response = self
            .api_get(&format!("/groups/{}", encoded), &[], "group")
            .await
            .map_err(|e| match e {
                PlatformError::NotFound(_) => {
                    PlatformError::NotFound(format!("group '{}'", full_path))
                }
                other => other,
            })?;

        let group: GitLabGroup = response
            .json()
            .await
            .map_err(|e| PlatformError::ParseError(e.to_string()))?;
        debug!(group = full_path, id = group.id, "Resolved group");
        Ok(group.id)
    }

    /// List every project of a group, including subgroups, filtered by the
    /// archived flag. Follows `X-Next-Page` until the last page.
    pub async fn list_projects(
        &self,
        group_id: u64,
        archived: bool,
    ) -> Result<Vec<RepositoryDescriptor>, PlatformError> {
        let endpoint = format!("/groups/{}/projects", group_id);
        let mut projects = Vec::new();
        let mut page = 1u32;

        loop {
            let query = [
                ("include_subgroups", "true".to_string()),
                ("with_shared", "false".to_string()),
                ("simple", "true".to_string()),
                ("archived", archived.to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let response = self.api_get(&endpoint, &query, "group_projects").await?;

            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());

            let batch: Vec<GitLabProject> = response
                .json()
                .await
                .map_err(|e| PlatformError::ParseError(e.to_string()))?;

            projects.extend(batch.into_iter().map(|p| {
                RepositoryDescriptor::new(p.id, p.path_with_namespace, p.http_url_to_repo, archived)
            }));

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        debug!(group_id, archived, count = projects.len(), "Listed projects");
        Ok(projects)
    }
}

#[async_trait]
impl ProjectSource for GitLabClient {
    async fn discover(&self, group_path: &str) -> Result<Vec<RepositoryDescriptor>, PlatformError> {
        let group_id = self.get_group_id(group_path).await?;

        let mut by_id: BTreeMap<u64, RepositoryDescriptor> = BTreeMap::new();
        for archived in [false, true] {
            for project in self.list_projects(group_id, archived).await? {
                by_id.insert(project.id, project);
            }
        }

        let mut projects: Vec<_> = by_id.into_values().collect();
        projects.sort_by(|a, b| a.path_with_namespace.cmp(&b.path_with_namespace));
        Ok(projects)
    }
}
