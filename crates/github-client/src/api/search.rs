use super::Page;
use crate::client::{GitHubClient, Query};
use crate::error::Result;
use crate::models::{CodeSearchItem, Issue, Repository, SearchResults, decode};

impl GitHubClient {
    pub async fn search_code(&self, query: &str, page: Page) -> Result<SearchResults<CodeSearchItem>> {
        let mut q: Query = vec![("q", query.to_string())];
        page.push(&mut q);
        decode(self.get("/search/code", &q).await?)
    }

    pub async fn search_repositories(
        &self,
        query: &str,
        sort: &str,
        page: Page,
    ) -> Result<SearchResults<Repository>> {
        let mut q: Query = vec![("q", query.to_string()), ("sort", sort.to_string())];
        page.push(&mut q);
        decode(self.get("/search/repositories", &q).await?)
    }

    pub async fn search_issues(
        &self,
        query: &str,
        sort: &str,
        page: Page,
    ) -> Result<SearchResults<Issue>> {
        let mut q: Query = vec![("q", query.to_string()), ("sort", sort.to_string())];
        page.push(&mut q);
        decode(self.get("/search/issues", &q).await?)
    }
}
