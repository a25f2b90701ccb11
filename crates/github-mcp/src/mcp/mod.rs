//! The HTTP surface: rmcp's streamable-HTTP transport at `/mcp`, `/health`, and CORS.
//!
//! The transport runs in stateful mode. `initialize` opens a session (`Mcp-Session-Id`), later
//! requests carry that id, `GET /mcp` opens the session's standalone event stream, and
//! `DELETE /mcp` ends the session.

mod server;

pub use server::GitHubMcp;

use crate::auth;
use crate::state::AppState;
use axum::Router;
use axum::http::{HeaderName, Method};
use axum::middleware;
use axum::routing::get;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

const SESSION_ID_HEADER: &str = "mcp-session-id";

/// `/mcp` behind the auth gate, `/health` outside it.
///
/// Cancelling `shutdown` ends every open session and event stream.
pub fn router(state: AppState, shutdown: CancellationToken) -> Router {
    let handler = GitHubMcp::new(state.clone());
    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            stateful_mode: true,
            cancellation_token: shutdown,
            ..StreamableHttpServerConfig::default()
        },
    );

    // Layers run outermost-last: authentication sees the request before normalization.
    let mcp = Router::new()
        .route_service("/mcp", service)
        .layer(middleware::from_fn(auth::force_event_stream_accept))
        .layer(middleware::from_fn_with_state(state, auth::require_api_key));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(mcp)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(SESSION_ID_HEADER)])
}
