use super::{Page, body};
use crate::client::{GitHubClient, Query};
use crate::error::Result;
use crate::models::{Gist, decode};
use crate::path::ApiPath;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One file of a gist write. For updates, `content: None` leaves the file alone.
#[derive(Debug, Clone, Serialize)]
pub struct GistFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl GistFile {
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGist {
    pub description: String,
    pub public: bool,
    pub files: BTreeMap<String, GistFile>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GistPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeMap<String, GistFile>>,
}

fn gist(id: &str) -> Result<ApiPath> {
    ApiPath::fixed("/gists").name(id)
}

impl GitHubClient {
    /// Gists of `username`, or of the authenticated user.
    pub async fn list_gists(&self, username: Option<&str>, page: Page) -> Result<Vec<Gist>> {
        let endpoint = match username {
            Some(u) => ApiPath::fixed("/users").name(u)?.seg("gists"),
            None => ApiPath::fixed("/gists"),
        };
        let mut q = Query::new();
        page.push(&mut q);
        decode(self.get(endpoint, &q).await?)
    }

    pub async fn get_gist(&self, id: &str) -> Result<Gist> {
        decode(self.get(gist(id)?, &[]).await?)
    }

    pub async fn create_gist(&self, new: &NewGist) -> Result<Gist> {
        decode(self.post("/gists", Some(&body(new)?)).await?)
    }

    pub async fn update_gist(&self, id: &str, patch: &GistPatch) -> Result<Gist> {
        decode(self.patch(gist(id)?, &body(patch)?).await?)
    }

    pub async fn delete_gist(&self, id: &str) -> Result<Value> {
        self.delete(gist(id)?, None).await
    }
}
