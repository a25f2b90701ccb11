use super::{Page, body, push_opt};
use crate::client::{GitHubClient, Query};
use crate::error::Result;
use crate::models::{Commit, MergeResult, PullRequest, PullRequestFile, Review, ReviewComment, decode};
use crate::path::ApiPath;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
    pub draft: bool,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PullRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeRequest {
    /// `merge`, `squash` or `rebase`.
    pub merge_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub body: String,
    /// `APPROVE`, `REQUEST_CHANGES` or `COMMENT`.
    pub event: String,
}

fn pull(owner: &str, repo: &str, number: u64) -> Result<ApiPath> {
    Ok(ApiPath::repo(owner, repo)?.seg("pulls").seg(number))
}

impl GitHubClient {
    pub async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        base: Option<&str>,
        page: Page,
    ) -> Result<Vec<PullRequest>> {
        let mut q: Query = vec![("state", state.to_string())];
        page.push(&mut q);
        push_opt(&mut q, "base", base);
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("pulls"), &q)
                .await?,
        )
    }

    pub async fn get_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequest> {
        decode(self.get(pull(owner, repo, number)?, &[]).await?)
    }

    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequest> {
        decode(
            self.post(ApiPath::repo(owner, repo)?.seg("pulls"), Some(&body(pr)?))
                .await?,
        )
    }

    pub async fn update_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        patch: &PullRequestPatch,
    ) -> Result<PullRequest> {
        decode(self.patch(pull(owner, repo, number)?, &body(patch)?).await?)
    }

    pub async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        merge: &MergeRequest,
    ) -> Result<MergeResult> {
        decode(
            self.put(pull(owner, repo, number)?.seg("merge"), &body(merge)?)
                .await?,
        )
    }

    pub async fn list_pull_request_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: Page,
    ) -> Result<Vec<Commit>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(
            self.get(pull(owner, repo, number)?.seg("commits"), &q)
                .await?,
        )
    }

    pub async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: Page,
    ) -> Result<Vec<PullRequestFile>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(
            self.get(pull(owner, repo, number)?.seg("files"), &q)
                .await?,
        )
    }

    pub async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        review: &NewReview,
    ) -> Result<Review> {
        decode(
            self.post(pull(owner, repo, number)?.seg("reviews"), Some(&body(review)?))
                .await?,
        )
    }

    /// Review comments attached to lines of the diff.
    pub async fn list_review_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: Page,
    ) -> Result<Vec<ReviewComment>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(
            self.get(pull(owner, repo, number)?.seg("comments"), &q)
                .await?,
        )
    }
}
