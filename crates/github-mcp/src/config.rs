//! Process settings, read once at startup from the environment.

use std::fmt;
use thiserror::Error;

pub const DEFAULT_SERVER_NAME: &str = "GitHub MCP Server";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid GH_ALLOWED_REPOS entry '{entry}': {reason}")]
    AllowList { entry: String, reason: &'static str },
}

/// One allow-list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowEntry {
    /// `owner/*` or a bare `owner`: every repository of that owner.
    AnyRepo { owner: String },
    /// `owner/repo`.
    Exact { owner: String, repo: String },
}

impl AllowEntry {
    /// Exact, case-sensitive comparison.
    #[must_use]
    pub fn matches(&self, owner: &str, repo: &str) -> bool {
        match self {
            Self::AnyRepo { owner: o } => o == owner,
            Self::Exact { owner: o, repo: r } => o == owner && r == repo,
        }
    }
}

impl fmt::Display for AllowEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyRepo { owner } => write!(f, "{owner}/*"),
            Self::Exact { owner, repo } => write!(f, "{owner}/{repo}"),
        }
    }
}

/// Ordered permit-set of repositories. Empty means every repository is permitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<AllowEntry>,
}

impl AllowList {
    /// Parse a comma-separated list such as `acme/*, acme-labs/tools, octo`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AllowList`] for an item with an empty owner (`/x`) or an empty
    /// repository part (`acme/`).
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut entries = Vec::new();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let entry = match item.split_once('/') {
                None => AllowEntry::AnyRepo {
                    owner: item.to_string(),
                },
                Some((owner, _)) if owner.is_empty() => {
                    return Err(ConfigError::AllowList {
                        entry: item.to_string(),
                        reason: "owner is empty",
                    });
                }
                Some((_, "")) => {
                    return Err(ConfigError::AllowList {
                        entry: item.to_string(),
                        reason: "repository is empty (use owner/* for all repositories)",
                    });
                }
                Some((owner, "*")) => AllowEntry::AnyRepo {
                    owner: owner.to_string(),
                },
                Some((owner, repo)) => AllowEntry::Exact {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                },
            };
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[AllowEntry] {
        &self.entries
    }

    /// `true` for an empty list, otherwise `true` iff some entry matches.
    #[must_use]
    pub fn permits(&self, owner: &str, repo: &str) -> bool {
        self.entries.is_empty() || self.entries.iter().any(|e| e.matches(owner, repo))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// GitHub token; empty means unauthenticated calls.
    pub github_token: String,
    /// REST API root, e.g. `https://ghe.example.com/api/v3` for GitHub Enterprise.
    pub api_url: String,
    pub default_owner: Option<String>,
    pub default_repo: Option<String>,
    pub allowed_repos: AllowList,
    /// Shared secret for inbound requests; `None` disables authentication.
    pub api_key: Option<String>,
    pub log_level: String,
    pub server_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            default_owner: None,
            default_repo: None,
            allowed_repos: AllowList::default(),
            api_key: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `GH_ALLOWED_REPOS` cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Blank values count as unset. Values are trimmed,
    /// except `MCP_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `GH_ALLOWED_REPOS` cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let allowed_repos = match get("GH_ALLOWED_REPOS") {
            Some(raw) => AllowList::parse(&raw)?,
            None => AllowList::default(),
        };

        Ok(Self {
            github_token: get("GH_TOKEN").unwrap_or_default(),
            api_url: get("GH_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            default_owner: get("GH_DEFAULT_OWNER"),
            default_repo: get("GH_DEFAULT_REPO"),
            allowed_repos,
            // Compared byte for byte with the presented credential, so it is not trimmed.
            api_key: lookup("MCP_API_KEY").filter(|v| !v.trim().is_empty()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            server_name: get("SERVER_NAME").unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
        })
    }

    #[must_use]
    pub fn auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}
