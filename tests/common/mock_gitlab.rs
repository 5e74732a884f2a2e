//! wiremock helpers for the GitLab API.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use glbak::GitLabClient;

pub const MOCK_TOKEN: &str = "glpat-mock-token";

/// Start a mock server and a client pointed at it.
pub async fn setup_gitlab_mock() -> (MockServer, GitLabClient) {
    let server = MockServer::start().await;
    let client = GitLabClient::new(&server.uri(), MOCK_TOKEN, Duration::from_secs(5), true)
        .expect("client builds");
    (server, client)
}

/// `simple=true` project representation.
pub fn project_json(id: u64, path: &str, url: &str) -> Value {
    let name = path.rsplit('/').next().unwrap_or(path);
    json!({
        "id": id,
        "name": name,
        "path": name,
        "path_with_namespace": path,
        "http_url_to_repo": url,
        "ssh_url_to_repo": format!("git@gitlab.example.com:{}.git", path),
        "web_url": format!("https://gitlab.example.com/{}", path),
    })
}

/// Answer `GET /api/v4/groups/<encoded path>` with the given id.
pub async fn mount_group(server: &MockServer, encoded_path: &str, id: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/groups/{}", encoded_path)))
        .and(header("PRIVATE-TOKEN", MOCK_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "full_path": encoded_path.replace("%2F", "/"),
        })))
        .mount(server)
        .await;
}

/// Answer one page of the project listing. `next_page` fills `X-Next-Page`
/// (empty on the last page, as GitLab does).
pub async fn mount_projects_page(
    server: &MockServer,
    group_id: u64,
    archived: bool,
    page: u32,
    next_page: Option<u32>,
    projects: Vec<Value>,
) {
    let next = next_page.map(|p| p.to_string()).unwrap_or_default();
    Mock::given(method("GET"))
        .and(path(format!("/api/v4/groups/{}/projects", group_id)))
        .and(query_param("archived", archived.to_string()))
        .and(query_param("page", page.to_string()))
        .and(query_param("include_subgroups", "true"))
        .and(header("PRIVATE-TOKEN", MOCK_TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Next-Page", next.as_str())
                .set_body_json(Value::Array(projects)),
        )
        .mount(server)
        .await;
}
