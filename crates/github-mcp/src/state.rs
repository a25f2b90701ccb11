use crate::config::Settings;
use crate::policy::AccessPolicy;
use std::sync::Arc;
use unrelated_github_client::GitHubClient;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub policy: Arc<AccessPolicy>,
    pub github: Arc<GitHubClient>,
}

impl AppState {
    #[must_use]
    pub fn new(settings: Settings, github: GitHubClient) -> Self {
        let policy = AccessPolicy::from_settings(&settings);
        Self {
            settings: Arc::new(settings),
            policy: Arc::new(policy),
            github: Arc::new(github),
        }
    }
}
