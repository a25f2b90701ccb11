//! Which repository a call targets, and whether it may.
//!
//! Resolution precedence, applied to owner and repository independently:
//! explicit per-call value > runtime override > configured default.
//! The placeholder values `user` (owner) and `repo` (repository) that naive clients send are
//! treated as absent.
//!
//! Resolution and authorization are separate steps. Tools that work at the account level only
//! resolve; tools that touch one repository must call [`AccessPolicy::resolve`] and then
//! [`AccessPolicy::is_allowed`], and refuse the call when the latter is `false`.

use crate::config::{AllowList, Settings};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

const OWNER_PLACEHOLDER: &str = "user";
const REPO_PLACEHOLDER: &str = "repo";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// No owner could be resolved from the call, the runtime override or the defaults.
    #[error("{0}")]
    Configuration(String),
    /// The target is not in the allow-list.
    #[error("Repository {owner}/{repo} is not in the allow-list")]
    Violation { owner: String, repo: String },
    /// Owner or repository is not a single GitHub name (`/`, `.` or `..`).
    #[error("Invalid repository name: {owner}/{repo}")]
    InvalidName { owner: String, repo: String },
}

/// A resolved `(owner, repo)` pair. `repo` may be empty for account-level calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub owner: String,
    pub repo: String,
}

impl Target {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// The in-memory default set by `set_default_repo`. Both fields are written together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeDefault {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

#[derive(Debug, Default)]
pub struct AccessPolicy {
    default_owner: Option<String>,
    default_repo: Option<String>,
    allow_list: AllowList,
    runtime: RwLock<RuntimeDefault>,
}

/// GitHub account and repository names never contain `/` and are never `.` or `..`.
fn is_single_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

fn check_names(owner: &str, repo: &str) -> Result<(), PolicyError> {
    if is_single_name(owner) && (repo.is_empty() || is_single_name(repo)) {
        Ok(())
    } else {
        Err(PolicyError::InvalidName {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

fn explicit<'a>(value: Option<&'a str>, placeholder: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(placeholder))
}

impl AccessPolicy {
    #[must_use]
    pub fn new(
        default_owner: Option<String>,
        default_repo: Option<String>,
        allow_list: AllowList,
    ) -> Self {
        Self {
            default_owner,
            default_repo,
            allow_list,
            runtime: RwLock::new(RuntimeDefault::default()),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.default_owner.clone(),
            settings.default_repo.clone(),
            settings.allowed_repos.clone(),
        )
    }

    #[must_use]
    pub fn default_owner(&self) -> Option<&str> {
        self.default_owner.as_deref()
    }

    #[must_use]
    pub fn default_repo(&self) -> Option<&str> {
        self.default_repo.as_deref()
    }

    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Snapshot of the runtime override.
    #[must_use]
    pub fn runtime(&self) -> RuntimeDefault {
        self.runtime.read().clone()
    }

    /// Resolve the target of a call.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Configuration`] when no owner can be resolved. An empty repository
    /// is not an error.
    pub fn resolve(&self, owner: Option<&str>, repo: Option<&str>) -> Result<Target, PolicyError> {
        let runtime = self.runtime.read().clone();

        let owner = explicit(owner, OWNER_PLACEHOLDER)
            .map(str::to_string)
            .or(runtime.owner)
            .or_else(|| self.default_owner.clone())
            .unwrap_or_default();
        let repo = explicit(repo, REPO_PLACEHOLDER)
            .map(str::to_string)
            .or(runtime.repo)
            .or_else(|| self.default_repo.clone())
            .unwrap_or_default();

        if owner.is_empty() {
            return Err(PolicyError::Configuration(
                "Repository owner is not specified and GH_DEFAULT_OWNER is not set".to_string(),
            ));
        }
        Ok(Target { owner, repo })
    }

    /// Case-sensitive, exact-string allow-list check. An empty allow-list permits everything.
    #[must_use]
    pub fn is_allowed(&self, owner: &str, repo: &str) -> bool {
        self.allow_list.permits(owner, repo)
    }

    /// [`AccessPolicy::is_allowed`] as a `Result`, for tools that refuse disallowed targets.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidName`] when owner or repository is not a single name (an
    /// allow-listed `acme/widgets` must not reach `acme/gadgets` through `widgets/..`), and
    /// [`PolicyError::Violation`] when the target is not permitted.
    pub fn authorize(&self, target: &Target) -> Result<(), PolicyError> {
        check_names(&target.owner, &target.repo)?;
        if self.is_allowed(&target.owner, &target.repo) {
            Ok(())
        } else {
            Err(PolicyError::Violation {
                owner: target.owner.clone(),
                repo: target.repo.clone(),
            })
        }
    }

    /// Replace the runtime override with `(owner, repo)`.
    ///
    /// Both fields change under one write lock, so readers see the old pair or the new pair.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidName`] or [`PolicyError::Violation`] and leaves the
    /// override untouched if the pair is not permitted.
    pub fn set_runtime_default(&self, owner: &str, repo: &str) -> Result<(), PolicyError> {
        check_names(owner, repo)?;
        if !self.is_allowed(owner, repo) {
            return Err(PolicyError::Violation {
                owner: owner.to_string(),
                repo: repo.to_string(),
            });
        }
        *self.runtime.write() = RuntimeDefault {
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
        };
        Ok(())
    }
}
