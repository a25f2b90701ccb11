#![allow(dead_code)]

pub mod mcp;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse as _;
use axum::routing::{get, patch, post};
use serde_json::{Value, json};
use tokio_util::sync::{CancellationToken, DropGuard};
use unrelated_github_client::GitHubClient;
use unrelated_github_mcp::{AppState, Settings, router};
use unrelated_test_support::TestServer;

pub use mcp::McpSession;
pub use unrelated_test_support::{KillOnDrop, pick_unused_port, wait_http_ok};

/// A canned subset of the GitHub REST API for `acme/widgets`.
pub fn fake_github() -> Router {
    Router::new()
        .merge(repository_routes())
        .merge(branch_routes())
        .merge(issue_routes())
        .merge(pull_routes())
        .merge(account_routes())
        .merge(actions_routes())
        .merge(gist_routes())
}

fn repository_routes() -> Router {
    Router::new()
        .route(
            "/repos/acme/widgets",
            get(|| async {
                Json(json!({
                    "name": "widgets",
                    "full_name": "acme/widgets",
                    "private": false,
                    "default_branch": "main",
                    "stargazers_count": 42,
                    "owner": { "login": "acme" }
                }))
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/repos/acme/gadgets",
            get(|| async { Json(json!({ "name": "gadgets", "full_name": "acme/gadgets" })) }),
        )
        .route(
            "/repos/acme/widgets/contents/README.md",
            get(|| async {
                Json(json!({
                    "name": "README.md",
                    "path": "README.md",
                    "sha": "abc123",
                    "size": 10,
                    "type": "file",
                    "encoding": "base64",
                    "content": "IyBXaWRnZXRz\nCg==\n"
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/contents/src",
            get(|| async {
                Json(json!([
                    { "name": "lib.rs", "path": "src/lib.rs", "type": "file", "size": 120 },
                    { "name": "bin", "path": "src/bin", "type": "dir", "size": 0 }
                ]))
            }),
        )
        .route(
            "/repos/acme/widgets/forks",
            get(|| async {
                Json(json!([{
                    "full_name": "bob/widgets",
                    "html_url": "https://github.com/bob/widgets",
                    "created_at": "2024-05-01T00:00:00Z"
                }]))
            })
            .post(|body: Bytes| async move {
                let name = serde_json::from_slice::<Value>(&body)
                    .ok()
                    .and_then(|b| b["name"].as_str().map(str::to_string))
                    .unwrap_or_else(|| "widgets".to_string());
                (
                    StatusCode::ACCEPTED,
                    Json(json!({
                        "name": name,
                        "full_name": format!("octocat/{name}"),
                        "html_url": format!("https://github.com/octocat/{name}"),
                        "clone_url": format!("https://github.com/octocat/{name}.git")
                    })),
                )
            }),
        )
        .route(
            "/search/issues",
            get(|| async {
                Json(json!({
                    "total_count": 2,
                    "incomplete_results": false,
                    "items": [
                        {
                            "number": 1,
                            "title": "Crash on start",
                            "state": "open",
                            "repository_url": "https://api.github.com/repos/acme/widgets",
                            "user": { "login": "alice" },
                            "labels": [{ "name": "bug" }]
                        },
                        {
                            "number": 2,
                            "title": "Fix crash",
                            "state": "closed",
                            "pull_request": { "url": "https://api.github.com/repos/acme/widgets/pulls/2" }
                        }
                    ]
                }))
            }),
        )
}

fn branch_routes() -> Router {
    Router::new()
        .route(
            "/repos/acme/widgets/git/ref/heads/main",
            get(|| async { Json(json!({ "ref": "refs/heads/main", "object": { "sha": "deadbeef" } })) }),
        )
        .route(
            "/repos/acme/widgets/git/refs",
            post(|Json(body): Json<Value>| async move {
                (
                    StatusCode::CREATED,
                    Json(json!({ "ref": body["ref"], "object": { "sha": body["sha"] } })),
                )
            }),
        )
        .route(
            "/repos/acme/widgets/branches/feature/login",
            get(|| async {
                Json(json!({
                    "name": "feature/login",
                    "protected": false,
                    "commit": { "sha": "f00dfeed", "html_url": "https://github.com/acme/widgets/commit/f00dfeed" }
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/git/refs/heads/feature/login",
            axum::routing::delete(|| async { StatusCode::NO_CONTENT }),
        )
        .route(
            "/repos/acme/widgets/commits/deadbeef",
            get(|| async {
                Json(json!({
                    "sha": "deadbeef",
                    "html_url": "https://github.com/acme/widgets/commit/deadbeef",
                    "commit": {
                        "message": "Add parser",
                        "author": { "name": "Alice", "email": "alice@example.com", "date": "2024-05-01T00:00:00Z" }
                    },
                    "stats": { "additions": 10, "deletions": 2, "total": 12 },
                    "files": [{ "filename": "src/parser.rs" }, { "filename": "src/lib.rs" }]
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/compare/main...feature",
            get(|| async {
                Json(json!({
                    "status": "ahead",
                    "ahead_by": 2,
                    "behind_by": 0,
                    "total_commits": 2,
                    "files": [{ "filename": "a" }],
                    "commits": [
                        { "sha": "0123456789abcdef", "commit": { "message": "First\n\nDetails" } },
                        { "sha": "fedcba9876543210", "commit": { "message": "Second" } }
                    ]
                }))
            }),
        )
}

fn issue_routes() -> Router {
    Router::new()
        .route(
            "/repos/acme/widgets/issues",
            get(|| async {
                Json(json!([
                    {
                        "number": 1,
                        "title": "Crash on start",
                        "state": "open",
                        "user": { "login": "alice" },
                        "labels": [{ "name": "bug" }],
                        "assignees": []
                    },
                    {
                        "number": 2,
                        "title": "Fix crash",
                        "state": "open",
                        "pull_request": { "url": "https://api.github.com/repos/acme/widgets/pulls/2" }
                    }
                ]))
            })
            .post(|Json(body): Json<Value>| async move {
                if body.get("title").and_then(Value::as_str).unwrap_or("").is_empty() {
                    return (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({
                            "message": "Validation failed",
                            "errors": [{ "message": "title is required" }]
                        })),
                    );
                }
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "number": 3,
                        "title": body["title"],
                        "html_url": "https://github.com/acme/widgets/issues/3"
                    })),
                )
            }),
        )
        .route(
            "/repos/acme/widgets/issues/1",
            // Echoes the patch so tests can see which fields were sent.
            patch(|Json(body): Json<Value>| async move {
                Json(json!({
                    "number": 1,
                    "title": body.get("title").cloned().unwrap_or(json!("Crash on start")),
                    "state": body.get("state").cloned().unwrap_or(json!("open")),
                    "html_url": "https://github.com/acme/widgets/issues/1",
                    "sent": body
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/issues/1/comments",
            get(|| async {
                Json(json!([{
                    "id": 11,
                    "body": "Seen on 1.2 too",
                    "user": { "login": "bob" },
                    "html_url": "https://github.com/acme/widgets/issues/1#issuecomment-11"
                }]))
            }),
        )
        .route(
            "/repos/acme/widgets/issues/1/labels",
            post(|Json(body): Json<Value>| async move {
                let mut names = vec![json!("bug")];
                names.extend(body["labels"].as_array().cloned().unwrap_or_default());
                Json(Value::Array(
                    names.into_iter().map(|n| json!({ "name": n })).collect(),
                ))
            }),
        )
        .route(
            "/repos/acme/widgets/labels",
            get(|| async {
                Json(json!([
                    { "name": "bug", "color": "d73a4a", "description": "Something is broken" },
                    { "name": "docs", "color": "0075ca" }
                ]))
            }),
        )
}

fn pull_routes() -> Router {
    Router::new()
        .route(
            "/repos/acme/widgets/pulls/2",
            patch(|Json(body): Json<Value>| async move {
                Json(json!({
                    "number": 2,
                    "title": body.get("title").cloned().unwrap_or(json!("Fix crash")),
                    "state": body.get("state").cloned().unwrap_or(json!("open")),
                    "html_url": "https://github.com/acme/widgets/pull/2"
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/pulls/2/commits",
            get(|| async {
                Json(json!([{
                    "sha": "0123456789abcdef",
                    "commit": { "message": "Fix crash\n\nCloses #1", "author": { "name": "Alice", "date": "2024-05-02T00:00:00Z" } }
                }]))
            }),
        )
        .route(
            "/repos/acme/widgets/pulls/2/files",
            get(|| async {
                Json(json!([
                    { "filename": "src/main.rs", "status": "modified", "additions": 600, "deletions": 0, "changes": 600, "patch": "+".repeat(600) },
                    { "filename": "logo.png", "status": "added", "additions": 0, "deletions": 0, "changes": 0 }
                ]))
            }),
        )
        .route(
            "/repos/acme/widgets/pulls/2/reviews",
            post(|Json(body): Json<Value>| async move {
                let state = match body["event"].as_str() {
                    Some("APPROVE") => "APPROVED",
                    Some("REQUEST_CHANGES") => "CHANGES_REQUESTED",
                    _ => "COMMENTED",
                };
                Json(json!({
                    "id": 80,
                    "state": state,
                    "body": body["body"],
                    "html_url": "https://github.com/acme/widgets/pull/2#pullrequestreview-80"
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/pulls/2/comments",
            get(|| async {
                Json(json!([{
                    "id": 90,
                    "body": "Nit: rename",
                    "path": "src/main.rs",
                    "line": 12,
                    "user": { "login": "carol" }
                }]))
            }),
        )
}

fn account_routes() -> Router {
    Router::new()
        .route(
            "/user",
            get(|| async {
                Json(json!({
                    "login": "octocat",
                    "html_url": "https://github.com/octocat",
                    "public_repos": 8
                }))
            }),
        )
        .route(
            "/user/followers",
            get(|| async {
                Json(json!([
                    { "login": "alice", "html_url": "https://github.com/alice", "avatar_url": "https://avatars.example/alice" },
                    { "login": "bob", "html_url": "https://github.com/bob" }
                ]))
            }),
        )
        .route(
            "/users/{login}/following",
            get(|Path(login): Path<String>| async move {
                Json(json!([{ "login": format!("followed-by-{login}") }]))
            }),
        )
        .route(
            "/users/{login}/orgs",
            get(|| async { Json(json!([{ "login": "acme", "description": "Widgets and gadgets" }])) }),
        )
}

fn actions_routes() -> Router {
    Router::new()
        .route(
            "/repos/acme/widgets/actions/workflows",
            get(|| async {
                Json(json!({
                    "total_count": 1,
                    "workflows": [{ "id": 7, "name": "CI", "path": ".github/workflows/ci.yml", "state": "active" }]
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/actions/workflows/ci.yml",
            get(|| async { Json(json!({ "id": 7, "name": "CI", "path": ".github/workflows/ci.yml", "state": "active" })) }),
        )
        .route(
            "/repos/acme/widgets/actions/workflows/7/dispatches",
            post(|Json(body): Json<Value>| async move {
                if body["ref"].as_str().is_none() {
                    return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "ref is required" })))
                        .into_response();
                }
                StatusCode::NO_CONTENT.into_response()
            }),
        )
        .route(
            "/repos/acme/widgets/actions/workflows/7/runs",
            get(|| async {
                Json(json!({
                    "total_count": 1,
                    "workflow_runs": [{
                        "id": 42,
                        "name": "CI",
                        "status": "completed",
                        "conclusion": "failure",
                        "head_branch": "main",
                        "head_sha": "0123456789abcdef",
                        "event": "push",
                        "run_attempt": 1
                    }]
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/actions/runs/42",
            get(|| async {
                Json(json!({ "id": 42, "name": "CI", "status": "completed", "conclusion": "failure", "run_number": 17 }))
            }),
        )
        .route(
            "/repos/acme/widgets/actions/runs/42/cancel",
            post(|| async { (StatusCode::ACCEPTED, Json(json!({}))) }),
        )
        .route(
            "/repos/acme/widgets/actions/runs/42/rerun",
            post(|| async { StatusCode::CREATED }),
        )
        .route(
            "/repos/acme/widgets/actions/runs/42/jobs",
            get(|| async {
                Json(json!({
                    "total_count": 1,
                    "jobs": [{
                        "id": 420,
                        "name": "test",
                        "status": "completed",
                        "conclusion": "failure",
                        "steps": [
                            { "name": "checkout", "status": "completed", "conclusion": "success", "number": 1 },
                            { "name": "cargo test", "status": "completed", "conclusion": "failure", "number": 2 }
                        ]
                    }]
                }))
            }),
        )
}

fn gist_routes() -> Router {
    Router::new()
        .route(
            "/gists",
            get(|| async {
                Json(json!([{
                    "id": "g1",
                    "description": "notes",
                    "public": false,
                    "files": { "notes.md": { "filename": "notes.md" } }
                }]))
            })
            .post(|Json(body): Json<Value>| async move {
                let files: serde_json::Map<String, Value> = body["files"]
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(name, _)| (name.clone(), json!({ "filename": name })))
                    .collect();
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "id": "g2",
                        "public": body["public"],
                        "html_url": "https://gist.github.com/g2",
                        "files": files
                    })),
                )
            }),
        )
        .route(
            "/gists/g1",
            get(|| async {
                Json(json!({
                    "id": "g1",
                    "description": "notes",
                    "owner": { "login": "octocat" },
                    "files": { "notes.md": { "filename": "notes.md", "language": "Markdown", "content": "# Notes" } }
                }))
            })
            .patch(|Json(body): Json<Value>| async move {
                let mut files = serde_json::Map::new();
                files.insert("notes.md".into(), json!({ "filename": "notes.md" }));
                for name in body["files"].as_object().map(|f| f.keys().cloned().collect::<Vec<_>>()).unwrap_or_default() {
                    files.insert(name.clone(), json!({ "filename": name }));
                }
                Json(json!({ "id": "g1", "html_url": "https://gist.github.com/g1", "files": files }))
            })
            .delete(|| async { StatusCode::NO_CONTENT }),
        )
}


/// Fake GitHub plus a running MCP server and an initialized session against it.
pub struct Harness {
    pub session: McpSession,
    pub github: TestServer,
    pub mcp: TestServer,
    pub state: AppState,
    pub http: reqwest::Client,
    _sessions: DropGuard,
}

impl Harness {
    /// Fake GitHub plus an MCP server configured by `env` pairs (GH_API_URL is filled in).
    /// The session authenticates with `MCP_API_KEY` when one is configured.
    pub async fn start(env: &[(&str, &str)]) -> anyhow::Result<Self> {
        let github = TestServer::spawn(fake_github()).await?;
        let api_url = github.url("");
        let pairs: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let settings = Settings::from_lookup(|key| {
            if key == "GH_API_URL" {
                return Some(api_url.clone());
            }
            pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })?;
        let client = GitHubClient::with_base_url(&settings.api_url, settings.github_token.clone());
        let api_key = settings.api_key.clone();
        let state = AppState::new(settings, client);

        let sessions = CancellationToken::new();
        let mcp = TestServer::spawn(router(state.clone(), sessions.clone())).await?;
        let session = McpSession::connect(mcp.url("/mcp"), api_key).await?;
        Ok(Self {
            session,
            github,
            mcp,
            state,
            http: reqwest::Client::new(),
            _sessions: sessions.drop_guard(),
        })
    }

    pub fn mcp_url(&self) -> String {
        self.mcp.url("/mcp")
    }

    pub async fn request(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        self.session.request(method, params).await
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> anyhow::Result<(bool, String)> {
        self.session.call_tool(name, arguments).await
    }

    pub async fn call_tool_json(&self, name: &str, arguments: Value) -> anyhow::Result<Value> {
        self.session.call_tool_json(name, arguments).await
    }

    /// A raw `initialize` POST with the headers a streamable-HTTP client sends, for tests that
    /// look at status codes rather than MCP replies.
    pub fn raw_initialize(&self) -> reqwest::RequestBuilder {
        self.http
            .post(self.mcp_url())
            .header("accept", "application/json, text/event-stream")
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": { "name": "raw", "version": "0" }
                }
            }))
    }
}
