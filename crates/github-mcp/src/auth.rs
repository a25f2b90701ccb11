//! Inbound request gating and normalization for the `/mcp` endpoint.

use crate::state::AppState;
use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse as _, Response};
use serde_json::json;
use std::net::SocketAddr;

pub const EVENT_STREAM_MIME_TYPE: &str = "text/event-stream";

/// Credential presented by the caller. `X-API-Key` wins over `Authorization: Bearer`.
///
/// Values are returned exactly as sent; surrounding whitespace is part of the credential.
fn extract_api_key_secret(headers: &HeaderMap) -> Option<String> {
    if let Some(v) = headers
        .get("x-api-key")
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return Some(v.to_string());
    }

    let authz = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    let token = authz.strip_prefix("Bearer ")?;
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// First `X-Forwarded-For` hop, else the socket peer.
fn client_address(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ci| ci.0.to_string())
}

pub(crate) fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Unauthorized: Invalid API Key" })),
    )
        .into_response()
}

/// Reject requests whose API key does not equal `MCP_API_KEY`. Open when no key is configured.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.settings.api_key.as_deref() else {
        return next.run(req).await;
    };

    match extract_api_key_secret(req.headers()) {
        Some(presented) if presented == expected => next.run(req).await,
        presented => {
            tracing::warn!(
                client = %client_address(&req),
                method = %req.method(),
                path = %req.uri().path(),
                credential_present = presented.is_some(),
                "rejected request with invalid api key"
            );
            unauthorized()
        }
    }
}

/// Some clients open the `GET /mcp` stream without declaring `Accept: text/event-stream`.
/// Rewrite the header so they reach the transport instead of a 406.
pub async fn force_event_stream_accept(mut req: Request, next: Next) -> Response {
    if req.method() == Method::GET && req.uri().path().ends_with("/mcp") {
        req.headers_mut().insert(
            header::ACCEPT,
            HeaderValue::from_static(EVENT_STREAM_MIME_TYPE),
        );
    }
    next.run(req).await
}
