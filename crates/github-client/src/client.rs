//! Authenticated GitHub REST transport.
//!
//! One [`GitHubClient`] is shared by every concurrent tool call. The underlying
//! `reqwest::Client` (connection pool) is created on first use under a single lock, reused by
//! all calls, released by [`GitHubClient::close`], and recreated transparently if a call
//! arrives after close.

use crate::error::{ClientError, Result};
use crate::path::ApiPath;
use parking_lot::Mutex;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = "GitHub-MCP-Server/1.0.0";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Query parameters for a single call, in wire order.
pub type Query = Vec<(&'static str, String)>;

pub struct GitHubClient {
    base_url: String,
    token: String,
    timeout: Duration,
    http: Mutex<Option<reqwest::Client>>,
    opened: AtomicU64,
    released: AtomicU64,
}

impl GitHubClient {
    /// Client for `https://api.github.com`. An empty token means unauthenticated calls.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            http: Mutex::new(None),
            opened: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    /// Override the per-request timeout (default 30s).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Whether a connection handle is currently live.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.http.lock().is_some()
    }

    /// Number of connection handles created so far.
    #[must_use]
    pub fn connections_opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    /// Number of connection handles released so far.
    #[must_use]
    pub fn connections_released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Release the live connection handle, if any.
    ///
    /// Idempotent: only the call that actually takes the handle counts as a release. A later
    /// [`GitHubClient::request`] creates a fresh handle.
    pub fn close(&self) {
        let taken = self.http.lock().take();
        if taken.is_some() {
            self.released.fetch_add(1, Ordering::Relaxed);
            debug!(base_url = %self.base_url, "github http connection released");
        }
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(API_VERSION),
        );
        if !self.token.is_empty() {
            let mut v = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
                ClientError::InvalidRequest("GitHub token contains invalid characters".to_string())
            })?;
            v.set_sensitive(true);
            headers.insert(AUTHORIZATION, v);
        }
        Ok(headers)
    }

    /// Return the live handle, creating it if absent.
    ///
    /// Creation happens under the lock, so concurrent first calls share one handle.
    fn connection(&self) -> Result<reqwest::Client> {
        let mut slot = self.http.lock();
        if let Some(c) = slot.as_ref() {
            return Ok(c.clone());
        }
        let c = reqwest::Client::builder()
            .default_headers(self.default_headers()?)
            .timeout(self.timeout)
            .build()
            .map_err(ClientError::from)?;
        *slot = Some(c.clone());
        self.opened.fetch_add(1, Ordering::Relaxed);
        debug!(base_url = %self.base_url, "github http connection created");
        Ok(c)
    }

    /// Absolute URL for `path`, each segment percent-escaped under the base URL's own path.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] if the base URL cannot carry a path.
    pub fn url_for(&self, path: &ApiPath, query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::InvalidRequest(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(path.segments());
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Perform one request against the GitHub API.
    ///
    /// - `204 No Content` yields `{"success": true}`
    /// - other success statuses yield the parsed JSON body, or `{}` when the body is empty
    /// - statuses >= 400 yield [`ClientError::Api`] with a message composed from the error body
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] classified as timeout, connection failure, API error, decode
    /// failure, or invalid request.
    pub async fn request(
        &self,
        method: Method,
        endpoint: impl Into<ApiPath>,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let endpoint = endpoint.into();
        let http = self.connection()?;
        let url = self.url_for(&endpoint, query)?;

        let mut req = http.request(method.clone(), url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.as_u16() >= 400 {
            let message = compose_error_message(status.as_u16(), &bytes);
            error!(
                status = status.as_u16(),
                method = %method,
                endpoint = %endpoint,
                message = %message,
                "github api error"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(no_content());
        }
        if bytes.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn get(&self, endpoint: impl Into<ApiPath>, query: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, endpoint, query, None).await
    }

    pub async fn post(&self, endpoint: impl Into<ApiPath>, body: Option<&Value>) -> Result<Value> {
        self.request(Method::POST, endpoint, &[], body).await
    }

    pub async fn put(&self, endpoint: impl Into<ApiPath>, body: &Value) -> Result<Value> {
        self.request(Method::PUT, endpoint, &[], Some(body)).await
    }

    pub async fn patch(&self, endpoint: impl Into<ApiPath>, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, endpoint, &[], Some(body)).await
    }

    pub async fn delete(&self, endpoint: impl Into<ApiPath>, body: Option<&Value>) -> Result<Value> {
        self.request(Method::DELETE, endpoint, &[], body).await
    }
}

impl Drop for GitHubClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// Success marker returned for `204 No Content`.
#[must_use]
pub fn no_content() -> Value {
    json!({ "success": true })
}

/// Build the human-readable message for a GitHub error response.
///
/// `{"message": m, "errors": [{"message": e1}, ...]}` becomes `"m (e1, ...)"`. A JSON object
/// without `message` keeps the generic `GitHub API error: <status>` text; a non-JSON body is
/// returned verbatim, and an empty body falls back to the generic text.
#[must_use]
pub fn compose_error_message(status: u16, body: &[u8]) -> String {
    let generic = format!("GitHub API error: {status}");

    let obj = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(obj)) => obj,
        _ => {
            let text = String::from_utf8_lossy(body);
            return if text.trim().is_empty() {
                generic
            } else {
                text.into_owned()
            };
        }
    };

    let mut message = obj
        .get("message")
        .and_then(Value::as_str)
        .map_or(generic, str::to_string);

    if let Some(errors) = obj.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        let details: Vec<String> = errors.iter().map(error_entry_message).collect();
        message.push_str(&format!(" ({})", details.join(", ")));
    }
    message
}

fn error_entry_message(entry: &Value) -> String {
    match entry {
        Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| other.to_string(), str::to_string),
    }
}
