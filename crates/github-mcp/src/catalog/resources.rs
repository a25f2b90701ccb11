use super::github_error_line;
use crate::state::AppState;
use rmcp::model::{AnnotateAble as _, RawResource, ReadResourceResult, Resource, ResourceContents};
use unrelated_github_client::models::User;

pub const USER_RESOURCE_URI: &str = "github://user";
const MARKDOWN: &str = "text/markdown";

#[must_use]
pub fn list_resources() -> Vec<Resource> {
    let mut user = RawResource::new(USER_RESOURCE_URI, "user");
    user.description = Some("The authenticated GitHub user".to_string());
    user.mime_type = Some(MARKDOWN.to_string());
    vec![user.no_annotation()]
}

fn render_user(user: &User) -> String {
    format!(
        "# GitHub User: {}\nURL: {}",
        user.login.as_deref().unwrap_or_default(),
        user.html_url.as_deref().unwrap_or_default()
    )
}

/// Read a resource, or `None` for an unknown URI.
///
/// # Errors
///
/// Returns a one-line message when GitHub cannot be reached or rejects the call.
pub async fn read_resource(
    state: &AppState,
    uri: &str,
) -> Option<Result<ReadResourceResult, String>> {
    if uri != USER_RESOURCE_URI {
        return None;
    }
    let result = state
        .github
        .get_authenticated_user()
        .await
        .map(|user| ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: USER_RESOURCE_URI.to_string(),
                mime_type: Some(MARKDOWN.to_string()),
                text: render_user(&user),
                meta: None,
            }],
        })
        .map_err(|e| github_error_line(&e));
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_login_and_url() {
        let user = User {
            login: Some("octocat".into()),
            html_url: Some("https://github.com/octocat".into()),
            ..User::default()
        };
        assert_eq!(
            render_user(&user),
            "# GitHub User: octocat\nURL: https://github.com/octocat"
        );
    }

    #[test]
    fn lists_the_user_resource() {
        let listed = list_resources();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].raw.uri, USER_RESOURCE_URI);
        assert_eq!(listed[0].raw.mime_type.as_deref(), Some(MARKDOWN));
    }
}
