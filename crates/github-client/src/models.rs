//! Response shapes for the GitHub endpoints this crate wraps.
//!
//! GitHub payloads are outside our control, so every field is optional or defaulted: a missing
//! field decodes to its default instead of failing the call. Only the fields the MCP surface
//! projects are modelled.

use crate::error::{ClientError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decode a raw API payload into a response shape.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if a present field has an incompatible JSON type.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub login: Option<String>,
    pub id: Option<u64>,
    pub html_url: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Only set by the contributors endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributions: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub public_repos: Option<u64>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub html_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub clone_url: Option<String>,
    pub private: Option<bool>,
    pub fork: Option<bool>,
    pub archived: Option<bool>,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
}

/// A file or directory entry from the contents API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentEntry {
    pub name: Option<String>,
    pub path: Option<String>,
    pub sha: Option<String>,
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub encoding: Option<String>,
    pub content: Option<String>,
    pub html_url: Option<String>,
    pub download_url: Option<String>,
}

/// `GET /repos/{owner}/{repo}/contents/{path}` answers with an object for files and an array
/// for directories.
#[derive(Debug, Clone)]
pub enum Contents {
    File(ContentEntry),
    Directory(Vec<ContentEntry>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRef {
    pub sha: Option<String>,
    pub html_url: Option<String>,
    pub message: Option<String>,
}

/// Result of a contents API write (create/update/delete).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCommit {
    pub content: Option<ContentEntry>,
    pub commit: CommitRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    pub name: Option<String>,
    pub commit: CommitRef,
    pub protected: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitObject {
    pub sha: Option<String>,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitReference {
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,
    pub object: GitObject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitActor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitDetail {
    pub message: Option<String>,
    pub author: Option<GitActor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub sha: Option<String>,
    pub html_url: Option<String>,
    pub commit: CommitDetail,
    pub author: Option<Account>,
    /// `stats` and `files` are only returned by the single-commit endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PullRequestFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
    pub user: Option<Account>,
    pub labels: Vec<Label>,
    pub assignees: Vec<Account>,
    pub comments: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub closed_at: Option<String>,
    /// Only set by the search endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// Present when the "issue" is actually a pull request.
    pub pull_request: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueComment {
    pub id: Option<u64>,
    pub body: Option<String>,
    pub user: Option<Account>,
    pub html_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestRef {
    #[serde(rename = "ref")]
    pub ref_name: Option<String>,
    pub sha: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
    pub user: Option<Account>,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
    pub draft: Option<bool>,
    pub merged: Option<bool>,
    pub mergeable: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub merged_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeResult {
    pub sha: Option<String>,
    pub merged: Option<bool>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestFile {
    pub filename: Option<String>,
    pub status: Option<String>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changes: Option<u64>,
    /// Unified diff hunk; absent for binary or very large files.
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: Option<u64>,
    pub state: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
    pub user: Option<Account>,
    pub submitted_at: Option<String>,
}

/// A comment on a line of a pull request diff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewComment {
    pub id: Option<u64>,
    pub body: Option<String>,
    pub path: Option<String>,
    pub line: Option<u64>,
    pub user: Option<Account>,
    pub html_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub login: Option<String>,
    pub id: Option<u64>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub state: Option<String>,
    pub html_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowList {
    pub total_count: u64,
    pub workflows: Vec<Workflow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRun {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub event: Option<String>,
    pub head_branch: Option<String>,
    pub head_sha: Option<String>,
    pub run_number: Option<u64>,
    pub run_attempt: Option<u64>,
    pub html_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowRunList {
    pub total_count: u64,
    pub workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobStep {
    pub name: Option<String>,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub number: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub html_url: Option<String>,
    pub steps: Vec<JobStep>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobList {
    pub total_count: u64,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GistFileInfo {
    pub filename: Option<String>,
    pub language: Option<String>,
    pub size: Option<u64>,
    pub raw_url: Option<String>,
    /// Only returned by the single-gist endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Gist {
    pub id: Option<String>,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub html_url: Option<String>,
    pub owner: Option<Account>,
    /// Keyed by file name.
    pub files: std::collections::BTreeMap<String, GistFileInfo>,
    pub comments: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryRef {
    pub full_name: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSearchItem {
    pub name: Option<String>,
    pub path: Option<String>,
    pub sha: Option<String>,
    pub html_url: Option<String>,
    pub repository: RepositoryRef,
}

/// Envelope shared by the `/search/*` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults<T> {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<T>,
}

impl<T> Default for SearchResults<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            incomplete_results: false,
            items: Vec::new(),
        }
    }
}
