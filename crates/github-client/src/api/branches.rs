use super::{Page, push_opt};
use crate::client::{GitHubClient, Query};
use crate::error::{ClientError, Result};
use crate::models::{Branch, Commit, GitReference, decode};
use crate::path::ApiPath;
use serde_json::{Value, json};

/// Filters for `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Default)]
pub struct ListCommits {
    /// Branch name or commit SHA to start listing from.
    pub sha: Option<String>,
    /// Only commits touching this path.
    pub path: Option<String>,
    pub page: Page,
}

impl GitHubClient {
    pub async fn list_branches(&self, owner: &str, repo: &str, page: Page) -> Result<Vec<Branch>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("branches"), &q)
                .await?,
        )
    }

    pub async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Branch> {
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("branches").tail(branch)?, &[])
                .await?,
        )
    }

    /// Create `branch_name` pointing at the current head of `from_ref`.
    pub async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch_name: &str,
        from_ref: &str,
    ) -> Result<GitReference> {
        let git = ApiPath::repo(owner, repo)?.seg("git");
        let source: GitReference = decode(
            self.get(git.clone().seg("ref").seg("heads").tail(from_ref)?, &[])
                .await?,
        )?;
        let sha = source.object.sha.ok_or_else(|| {
            ClientError::Decode(format!("ref heads/{from_ref} has no object.sha"))
        })?;

        // Same segment rules as the lookup above, so the new ref name cannot smuggle `..`.
        ApiPath::fixed("/").tail(branch_name)?;
        let payload = json!({ "ref": format!("refs/heads/{branch_name}"), "sha": sha });
        decode(self.post(git.seg("refs"), Some(&payload)).await?)
    }

    pub async fn delete_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Value> {
        self.delete(
            ApiPath::repo(owner, repo)?
                .seg("git")
                .seg("refs")
                .seg("heads")
                .tail(branch)?,
            None,
        )
        .await
    }

    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        filter: &ListCommits,
    ) -> Result<Vec<Commit>> {
        let mut q = Query::new();
        filter.page.push(&mut q);
        push_opt(&mut q, "sha", filter.sha.as_deref());
        push_opt(&mut q, "path", filter.path.as_deref());
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("commits"), &q)
                .await?,
        )
    }

    pub async fn get_commit(&self, owner: &str, repo: &str, git_ref: &str) -> Result<Commit> {
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("commits").tail(git_ref)?, &[])
                .await?,
        )
    }

    /// Raw comparison payload; its shape varies too much to model usefully.
    pub async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Value> {
        let endpoint = ApiPath::repo(owner, repo)?
            .seg("compare")
            .tail(&format!("{base}...{head}"))?;
        self.get(endpoint, &[]).await
    }
}
