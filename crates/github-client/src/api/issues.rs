use super::{Page, body, push_opt};
use crate::client::{GitHubClient, Query};
use crate::error::Result;
use crate::models::{Issue, IssueComment, Label, decode};
use crate::path::ApiPath;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    /// `open`, `closed` or `all`; GitHub defaults to `open`.
    pub state: Option<String>,
    /// Comma-separated label names.
    pub labels: Option<String>,
    pub assignee: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssuePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

fn issue(owner: &str, repo: &str, number: u64) -> Result<ApiPath> {
    Ok(ApiPath::repo(owner, repo)?.seg("issues").seg(number))
}

impl GitHubClient {
    pub async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        filter: &IssueFilter,
    ) -> Result<Vec<Issue>> {
        let mut q: Query = vec![(
            "state",
            filter.state.clone().unwrap_or_else(|| "open".to_string()),
        )];
        filter.page.push(&mut q);
        push_opt(&mut q, "labels", filter.labels.as_deref());
        push_opt(&mut q, "assignee", filter.assignee.as_deref());
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("issues"), &q)
                .await?,
        )
    }

    pub async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Issue> {
        decode(self.get(issue(owner, repo, number)?, &[]).await?)
    }

    pub async fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue) -> Result<Issue> {
        decode(
            self.post(ApiPath::repo(owner, repo)?.seg("issues"), Some(&body(issue)?))
                .await?,
        )
    }

    pub async fn update_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        patch: &IssuePatch,
    ) -> Result<Issue> {
        decode(
            self.patch(issue(owner, repo, number)?, &body(patch)?)
                .await?,
        )
    }

    pub async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: Page,
    ) -> Result<Vec<IssueComment>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(
            self.get(issue(owner, repo, number)?.seg("comments"), &q)
                .await?,
        )
    }

    pub async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        text: &str,
    ) -> Result<IssueComment> {
        decode(
            self.post(
                issue(owner, repo, number)?.seg("comments"),
                Some(&json!({ "body": text })),
            )
            .await?,
        )
    }

    pub async fn list_labels(&self, owner: &str, repo: &str) -> Result<Vec<Label>> {
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("labels"), &[])
                .await?,
        )
    }

    /// Add labels to an issue; answers with the issue's full label set afterwards.
    pub async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<Vec<Label>> {
        decode(
            self.post(
                issue(owner, repo, number)?.seg("labels"),
                Some(&json!({ "labels": labels })),
            )
            .await?,
        )
    }
}
