use super::{Page, body};
use crate::client::{GitHubClient, Query};
use crate::error::Result;
use crate::models::{Account, Repository, decode};
use crate::path::ApiPath;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

/// Where a fork lands. Both `None` forks into the authenticated account under the same name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForkRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl GitHubClient {
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        decode(self.get(ApiPath::repo(owner, repo)?, &[]).await?)
    }

    /// Repositories of the authenticated user (`/user/repos`).
    pub async fn list_user_repos(
        &self,
        repo_type: &str,
        sort: &str,
        page: Page,
    ) -> Result<Vec<Repository>> {
        let mut q: Query = vec![("type", repo_type.to_string()), ("sort", sort.to_string())];
        page.push(&mut q);
        decode(self.get("/user/repos", &q).await?)
    }

    /// Create a repository for the authenticated user, or under `org` when given.
    pub async fn create_repository(
        &self,
        new: &NewRepository,
        org: Option<&str>,
    ) -> Result<Repository> {
        let endpoint = match org {
            Some(org) => ApiPath::fixed("/orgs").name(org)?.seg("repos"),
            None => ApiPath::fixed("/user/repos"),
        };
        decode(self.post(endpoint, Some(&body(new)?)).await?)
    }

    pub async fn delete_repository(&self, owner: &str, repo: &str) -> Result<Value> {
        self.delete(ApiPath::repo(owner, repo)?, None).await
    }

    /// Bytes of code per language.
    pub async fn list_languages(&self, owner: &str, repo: &str) -> Result<BTreeMap<String, u64>> {
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("languages"), &[])
                .await?,
        )
    }

    pub async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
        page: Page,
    ) -> Result<Vec<Account>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("contributors"), &q)
                .await?,
        )
    }

    /// Start a fork. GitHub creates forks asynchronously and answers 202 with the new
    /// repository's metadata.
    pub async fn fork_repository(
        &self,
        owner: &str,
        repo: &str,
        fork: &ForkRequest,
    ) -> Result<Repository> {
        let payload = body(fork)?;
        let payload = payload
            .as_object()
            .is_some_and(|o| !o.is_empty())
            .then_some(&payload);
        decode(
            self.post(ApiPath::repo(owner, repo)?.seg("forks"), payload)
                .await?,
        )
    }

    pub async fn list_forks(&self, owner: &str, repo: &str, page: Page) -> Result<Vec<Repository>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(
            self.get(ApiPath::repo(owner, repo)?.seg("forks"), &q)
                .await?,
        )
    }
}
