use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use unrelated_github_client::models::Contents;
use unrelated_github_client::{ClientError, GitHubClient};
use unrelated_test_support::{TestServer, pick_unused_port};

fn header(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map_or(Value::Null, |s| Value::String(s.to_string()))
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "accept": header(&headers, "accept"),
        "user_agent": header(&headers, "user-agent"),
        "api_version": header(&headers, "x-github-api-version"),
        "authorization": header(&headers, "authorization"),
    }))
}

async fn validation_failed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": "Validation failed",
            "errors": [{ "message": "name is required" }],
            "documentation_url": "https://docs.github.com/rest"
        })),
    )
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({}))
}

fn fake_github() -> Router {
    Router::new()
        .route("/echo", get(echo_headers))
        .route("/no-content", get(|| async { StatusCode::NO_CONTENT }))
        .route("/empty", get(|| async { StatusCode::OK }))
        .route("/user/repos", post(validation_failed))
        .route(
            "/maintenance",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") }),
        )
        .route(
            "/gone",
            get(|| async { StatusCode::GONE }),
        )
        .route("/slow", get(slow))
        .route(
            "/repos/acme/widgets/contents/README.md",
            get(|| async {
                Json(json!({
                    "name": "README.md",
                    "path": "README.md",
                    "type": "file",
                    "encoding": "base64",
                    "content": "IyBXaWRnZXRz\nCg==\n",
                }))
            }),
        )
        .route(
            "/repos/acme/widgets/contents/src",
            get(|| async {
                Json(json!([
                    { "name": "lib.rs", "path": "src/lib.rs", "type": "file" },
                    { "name": "bin", "path": "src/bin", "type": "dir" }
                ]))
            }),
        )
}

#[tokio::test]
async fn attaches_fixed_headers_and_bearer_token() -> anyhow::Result<()> {
    let server = TestServer::spawn(fake_github()).await?;
    let client = GitHubClient::with_base_url(server.url(""), "ghp_test");

    let echoed = client.get("/echo", &[]).await?;
    assert_eq!(echoed["accept"], "application/vnd.github.v3+json");
    assert_eq!(echoed["user_agent"], "GitHub-MCP-Server/1.0.0");
    assert_eq!(echoed["api_version"], "2022-11-28");
    assert_eq!(echoed["authorization"], "Bearer ghp_test");

    let anon = GitHubClient::with_base_url(server.url(""), "");
    let echoed = anon.get("/echo", &[]).await?;
    assert_eq!(echoed["authorization"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn no_content_is_a_success_marker() -> anyhow::Result<()> {
    let server = TestServer::spawn(fake_github()).await?;
    let client = GitHubClient::with_base_url(server.url(""), "");

    let v = client.get("/no-content", &[]).await?;
    assert_eq!(v, json!({ "success": true }));

    let v = client.get("/empty", &[]).await?;
    assert_eq!(v, json!({}));
    Ok(())
}

#[tokio::test]
async fn api_errors_compose_message_and_status() -> anyhow::Result<()> {
    let server = TestServer::spawn(fake_github()).await?;
    let client = GitHubClient::with_base_url(server.url(""), "");

    let err = client
        .post("/user/repos", Some(&json!({ "name": "" })))
        .await
        .unwrap_err();
    match &err {
        ClientError::Api { status, message } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "Validation failed (name is required)");
        }
        other => panic!("expected api error, got {other:?}"),
    }

    let err = client.get("/maintenance", &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "down for maintenance");
    assert!(err.is_retryable());

    let err = client.get("/gone", &[]).await.unwrap_err();
    assert_eq!(err.to_string(), "GitHub API error: 410");

    let err = client.get("/does-not-exist", &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    Ok(())
}

#[tokio::test]
async fn slow_responses_time_out() -> anyhow::Result<()> {
    let server = TestServer::spawn(fake_github()).await?;
    let client =
        GitHubClient::with_base_url(server.url(""), "").with_timeout(Duration::from_millis(200));

    let err = client.get("/slow", &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)), "got {err:?}");
    assert_eq!(err.category(), "timeout");
    Ok(())
}

#[tokio::test]
async fn refused_connections_are_connection_failures() -> anyhow::Result<()> {
    let port = pick_unused_port()?;
    let client = GitHubClient::with_base_url(format!("http://127.0.0.1:{port}"), "");

    let err = client.get("/user", &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn close_is_idempotent_and_calls_reopen() -> anyhow::Result<()> {
    let server = TestServer::spawn(fake_github()).await?;
    let client = GitHubClient::with_base_url(server.url(""), "");

    client.close();
    assert_eq!(client.connections_released(), 0);

    client.get("/echo", &[]).await?;
    assert!(client.is_open());
    assert_eq!(client.connections_opened(), 1);

    client.close();
    client.close();
    assert!(!client.is_open());
    assert_eq!(client.connections_released(), 1);

    client.get("/echo", &[]).await?;
    assert!(client.is_open());
    assert_eq!(client.connections_opened(), 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_first_use_creates_one_connection() -> anyhow::Result<()> {
    let server = TestServer::spawn(fake_github()).await?;
    let client = Arc::new(GitHubClient::with_base_url(server.url(""), ""));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(async move { client.get("/echo", &[]).await }));
    }
    for t in tasks {
        t.await??;
    }
    assert_eq!(client.connections_opened(), 1);
    Ok(())
}

#[tokio::test]
async fn contents_decode_files_and_list_directories() -> anyhow::Result<()> {
    let server = TestServer::spawn(fake_github()).await?;
    let client = GitHubClient::with_base_url(server.url(""), "");

    match client
        .get_contents("acme", "widgets", "README.md", None)
        .await?
    {
        Contents::File(f) => {
            assert_eq!(f.content.as_deref(), Some("# Widgets\n"));
            assert_eq!(f.encoding.as_deref(), Some("utf-8"));
        }
        Contents::Directory(_) => panic!("expected a file"),
    }

    match client.get_contents("acme", "widgets", "src", None).await? {
        Contents::Directory(entries) => {
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[1].entry_type.as_deref(), Some("dir"));
        }
        Contents::File(_) => panic!("expected a directory"),
    }
    Ok(())
}
