//! Error types for `unrelated-github-client`.

use thiserror::Error;
use url::Url;

/// Classified failure of a GitHub API call.
///
/// The client never retries; callers use [`ClientError::is_retryable`] and
/// [`ClientError::status`] to decide what to do next.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request did not complete within the client timeout.
    #[error("GitHub API request timed out: {0}")]
    Timeout(String),

    /// DNS failure, refused/reset connection, or an I/O error mid-exchange.
    #[error("GitHub API connection failed: {0}")]
    Connection(String),

    /// GitHub answered with a status >= 400.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A success response whose body is not valid JSON (or not the expected shape).
    #[error("GitHub API response could not be decoded: {0}")]
    Decode(String),

    /// The request could not be built (bad URL, invalid header value).
    #[error("invalid GitHub API request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// HTTP status for API errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short stable category string, suitable for logs and structured tool errors.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Connection(_) => "transport",
            Self::Api { status, .. } if *status >= 500 => "upstream_5xx",
            Self::Api { .. } => "api",
            Self::Decode(_) => "deserialize",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Whether repeating the same call later could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::InvalidRequest(_) => false,
        }
    }
}

/// Result type alias for GitHub client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        let msg = sanitize_reqwest_error(&value);
        if value.is_timeout() {
            Self::Timeout(msg)
        } else if value.is_builder() {
            Self::InvalidRequest(msg)
        } else if value.is_decode() {
            Self::Decode(msg)
        } else {
            // connect, request, body, redirect: all surface as a failed exchange
            Self::Connection(msg)
        }
    }
}

/// Drop credentials, query and fragment from a URL before it reaches logs or callers.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
