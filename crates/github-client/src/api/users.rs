use super::Page;
use crate::client::{GitHubClient, Query};
use crate::error::Result;
use crate::models::{Account, Organization, User, decode};
use crate::path::ApiPath;

/// `/users/{username}/{leaf}`, or `/user/{leaf}` for the authenticated user.
fn user_scoped(username: Option<&str>, leaf: &'static str) -> Result<ApiPath> {
    Ok(match username {
        Some(u) => ApiPath::fixed("/users").name(u)?.seg(leaf),
        None => ApiPath::fixed("/user").seg(leaf),
    })
}

impl GitHubClient {
    pub async fn get_authenticated_user(&self) -> Result<User> {
        decode(self.get("/user", &[]).await?)
    }

    pub async fn get_user(&self, username: &str) -> Result<User> {
        decode(self.get(ApiPath::fixed("/users").name(username)?, &[]).await?)
    }

    pub async fn list_followers(&self, username: Option<&str>, page: Page) -> Result<Vec<Account>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(self.get(user_scoped(username, "followers")?, &q).await?)
    }

    pub async fn list_following(&self, username: Option<&str>, page: Page) -> Result<Vec<Account>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(self.get(user_scoped(username, "following")?, &q).await?)
    }

    pub async fn list_user_orgs(
        &self,
        username: Option<&str>,
        page: Page,
    ) -> Result<Vec<Organization>> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(self.get(user_scoped(username, "orgs")?, &q).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::user_scoped;

    #[test]
    fn missing_username_means_the_authenticated_user() {
        assert_eq!(user_scoped(None, "orgs").unwrap().to_string(), "/user/orgs");
        assert_eq!(
            user_scoped(Some("octocat"), "followers").unwrap().to_string(),
            "/users/octocat/followers"
        );
        assert!(user_scoped(Some("../admin"), "orgs").is_err());
    }
}
