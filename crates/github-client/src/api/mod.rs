//! Thin endpoint wrappers: one method per GitHub REST endpoint.
//!
//! Each wrapper only builds the endpoint path, query and body, then decodes the response into a
//! [`crate::models`] shape. Owner/repo authorization is the caller's job.

mod actions;
mod branches;
mod contents;
mod gists;
mod issues;
mod pulls;
mod repos;
mod search;
mod users;

pub use actions::{RunFilter, WorkflowDispatch};
pub use branches::ListCommits;
pub use contents::FileWrite;
pub use gists::{GistFile, GistPatch, NewGist};
pub use issues::{IssueFilter, IssuePatch, NewIssue};
pub use pulls::{MergeRequest, NewPullRequest, NewReview, PullRequestPatch};
pub use repos::{ForkRequest, NewRepository};

use crate::client::Query;
use crate::error::{ClientError, Result};
use serde::Serialize;
use serde_json::Value;

/// Pagination shared by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub per_page: u32,
    pub page: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            per_page: 30,
            page: 1,
        }
    }
}

impl Page {
    /// GitHub caps `per_page` at 100; page numbers start at 1.
    #[must_use]
    pub fn new(per_page: u32, page: u32) -> Self {
        Self {
            per_page: per_page.clamp(1, 100),
            page: page.max(1),
        }
    }

    fn push(self, q: &mut Query) {
        q.push(("per_page", self.per_page.to_string()));
        q.push(("page", self.page.to_string()));
    }
}

fn push_opt(q: &mut Query, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        q.push((key, v.to_string()));
    }
}

fn body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ClientError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamps_to_github_limits() {
        assert_eq!(Page::new(500, 0), Page { per_page: 100, page: 1 });
        assert_eq!(Page::new(0, 3), Page { per_page: 1, page: 3 });
    }

    #[test]
    fn push_opt_skips_empty_values() {
        let mut q = Query::new();
        push_opt(&mut q, "sha", Some(""));
        push_opt(&mut q, "path", None);
        push_opt(&mut q, "ref", Some("main"));
        assert_eq!(q, vec![("ref", "main".to_string())]);
    }
}
