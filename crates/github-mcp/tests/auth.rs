mod common;

use common::{Harness, McpSession};
use serde_json::{Value, json};

const KEY: &[(&str, &str)] = &[("MCP_API_KEY", "abc")];

#[tokio::test]
async fn open_mode_accepts_requests_without_credentials() -> anyhow::Result<()> {
    let h = Harness::start(&[]).await?;
    let resp = h.raw_initialize().send().await?;
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().contains_key("mcp-session-id"));
    Ok(())
}

#[tokio::test]
async fn api_key_header_and_bearer_are_both_accepted() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;

    let via_header = h.raw_initialize().header("x-api-key", "abc").send().await?;
    assert_eq!(via_header.status(), 200);

    let via_bearer = h.raw_initialize().bearer_auth("abc").send().await?;
    assert_eq!(via_bearer.status(), 200);
    Ok(())
}

#[tokio::test]
async fn x_api_key_takes_precedence_over_bearer() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;
    let resp = h
        .raw_initialize()
        .header("x-api-key", "wrong")
        .bearer_auth("abc")
        .send()
        .await?;
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({ "detail": "Unauthorized: Invalid API Key" }));
    Ok(())
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_rejected() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;

    let none = h.raw_initialize().send().await?;
    assert_eq!(none.status(), 401);

    let case = h.raw_initialize().header("x-api-key", "ABC").send().await?;
    assert_eq!(case.status(), 401);

    let basic = h
        .raw_initialize()
        .header("authorization", "Basic abc")
        .send()
        .await?;
    assert_eq!(basic.status(), 401);

    assert!(McpSession::connect(h.mcp_url(), None).await.is_err());
    assert!(McpSession::connect(h.mcp_url(), Some("abd".into())).await.is_err());
    Ok(())
}

#[tokio::test]
async fn credentials_are_compared_without_trimming() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;

    let padded = h
        .raw_initialize()
        .header("authorization", "Bearer  abc")
        .send()
        .await?;
    assert_eq!(padded.status(), 401);

    let lowercase_scheme = h
        .raw_initialize()
        .header("authorization", "bearer abc")
        .send()
        .await?;
    assert_eq!(lowercase_scheme.status(), 401);

    let exact = h
        .raw_initialize()
        .header("authorization", "Bearer abc")
        .send()
        .await?;
    assert_eq!(exact.status(), 200);
    Ok(())
}

#[tokio::test]
async fn health_is_outside_the_gate() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;
    let resp = h.http.get(h.mcp.url("/health")).send().await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await?, "ok");
    Ok(())
}

#[tokio::test]
async fn get_mcp_is_normalized_then_handed_to_the_transport() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;

    let unauthenticated = h.http.get(h.mcp_url()).send().await?;
    assert_eq!(unauthenticated.status(), 401);

    // No Accept header: normalization supplies text/event-stream, so the transport asks for a
    // session instead of answering 406.
    let sessionless = h
        .http
        .get(h.mcp_url())
        .header("x-api-key", "abc")
        .send()
        .await?;
    assert_eq!(sessionless.status(), 401);
    assert_eq!(sessionless.text().await?, "Unauthorized: Session ID is required");

    let stream = h
        .http
        .get(h.mcp_url())
        .header("x-api-key", "abc")
        .header("mcp-session-id", h.session.session_id())
        .send()
        .await?;
    assert_eq!(stream.status(), 200);
    assert_eq!(
        stream
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );
    Ok(())
}

#[tokio::test]
async fn delete_ends_the_session() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;
    h.request("tools/list", json!({})).await?;

    let closed = h
        .http
        .delete(h.mcp_url())
        .header("x-api-key", "abc")
        .header("mcp-session-id", h.session.session_id())
        .send()
        .await?;
    assert!(closed.status().is_success(), "status {}", closed.status());

    assert!(h.request("tools/list", json!({})).await.is_err());
    Ok(())
}

#[tokio::test]
async fn cors_preflight_is_answered_without_credentials() -> anyhow::Result<()> {
    let h = Harness::start(KEY).await?;
    let resp = h
        .http
        .request(reqwest::Method::OPTIONS, h.mcp_url())
        .header("origin", "https://inspector.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type, x-api-key")
        .send()
        .await?;
    assert!(resp.status().is_success(), "status {}", resp.status());
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    Ok(())
}
