//! Endpoint paths built from individual segments.
//!
//! Caller-supplied names (owner, repo, branch, file path) never get spliced into a URL string.
//! Each one becomes its own path segment, is checked here, and is percent-escaped by
//! [`url::Url::path_segments_mut`] when the request URL is built. A name like `..` or `a/b`
//! therefore cannot move a request to a different repository than the one that was authorized.

use crate::error::{ClientError, Result};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
}

impl ApiPath {
    /// A fixed path such as `/user/repos`.
    #[must_use]
    pub fn fixed(literal: &'static str) -> Self {
        Self {
            segments: literal
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// `/repos/{owner}/{repo}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] if either name is not a single path segment.
    pub fn repo(owner: &str, repo: &str) -> Result<Self> {
        Self::fixed("/repos").name(owner)?.name(repo)
    }

    /// Append a fixed segment or a number.
    #[must_use]
    pub fn seg(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Append one caller-supplied name. It must be non-empty, contain no `/`, and not be `.` or
    /// `..`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] for anything else.
    pub fn name(mut self, name: &str) -> Result<Self> {
        check_segment(name)?;
        if name.contains('/') {
            return Err(invalid(name, "must not contain '/'"));
        }
        self.segments.push(name.to_string());
        Ok(self)
    }

    /// Append a caller-supplied slash-separated path (a file path, or a branch such as
    /// `feature/login`). Empty segments are dropped; `.` and `..` are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidRequest`] if a segment is `.` or `..`.
    pub fn tail(mut self, path: &str) -> Result<Self> {
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            check_segment(segment)?;
            self.segments.push(segment.to_string());
        }
        Ok(self)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<&'static str> for ApiPath {
    fn from(literal: &'static str) -> Self {
        Self::fixed(literal)
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for s in &self.segments {
            write!(f, "/{s}")?;
        }
        Ok(())
    }
}

fn check_segment(segment: &str) -> Result<()> {
    match segment {
        "" => Err(invalid(segment, "must not be empty")),
        "." | ".." => Err(invalid(segment, "relative path segments are not allowed")),
        _ => Ok(()),
    }
}

fn invalid(segment: &str, reason: &str) -> ClientError {
    ClientError::InvalidRequest(format!("invalid path segment '{segment}': {reason}"))
}
