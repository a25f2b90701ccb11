//! MCP tools and resources backed by the GitHub API.
//!
//! Every tool that targets one repository resolves the target through
//! [`crate::policy::AccessPolicy::resolve`], checks it with
//! [`crate::policy::AccessPolicy::authorize`], and only then calls GitHub. Refusals are returned
//! as a normal tool result carrying `{"error": "..."}`; GitHub failures become `isError` results.

mod actions;
mod args;
mod branches;
mod files;
mod gists;
mod issues;
mod pulls;
mod repos;
mod resources;
mod search;
mod users;

pub use resources::{USER_RESOURCE_URI, list_resources, read_resource};

use crate::policy::{PolicyError, Target};
use crate::state::AppState;
use args::Args;
use reqwest::Method;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use unrelated_github_client::ClientError;

/// Failures that are not tool results. The MCP handler answers them with `-32602`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

/// Outcome of a single tool handler before it is rendered as a [`CallToolResult`].
#[derive(Debug)]
pub(crate) enum ToolError {
    Arguments(String),
    Policy(PolicyError),
    /// A structured refusal that is not a policy decision (e.g. "this path is a directory").
    Refused(String),
    GitHub(ClientError),
    /// A successful GitHub response that could not be serialized back out.
    Internal(String),
}

impl From<PolicyError> for ToolError {
    fn from(value: PolicyError) -> Self {
        Self::Policy(value)
    }
}

impl From<ClientError> for ToolError {
    fn from(value: ClientError) -> Self {
        Self::GitHub(value)
    }
}

pub(crate) type ToolOutcome = Result<Value, ToolError>;

/// Static description of one tool.
pub(crate) struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    /// HTTP method of the underlying GitHub call; `None` for tools that never leave the process.
    pub method: Option<Method>,
    pub properties: Value,
    pub required: &'static [&'static str],
}

fn definitions() -> Vec<ToolDef> {
    let mut defs = repos::tools();
    defs.extend(files::tools());
    defs.extend(branches::tools());
    defs.extend(issues::tools());
    defs.extend(pulls::tools());
    defs.extend(users::tools());
    defs.extend(search::tools());
    defs.extend(actions::tools());
    defs.extend(gists::tools());
    defs
}

fn annotations_for(method: Option<&Method>) -> ToolAnnotations {
    let Some(method) = method else {
        return ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint: Some(false),
        };
    };

    let (read_only, destructive, idempotent) = if method == Method::GET {
        (true, false, Some(true))
    } else if method == Method::POST {
        (false, false, Some(false))
    } else if method == Method::PATCH {
        (false, true, None)
    } else {
        // PUT and DELETE
        (false, true, Some(true))
    };
    ToolAnnotations {
        title: None,
        read_only_hint: Some(read_only),
        destructive_hint: Some(destructive),
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}

fn input_schema(def: &ToolDef) -> JsonObject {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), def.properties.clone());
    if !def.required.is_empty() {
        schema.insert("required".to_string(), json!(def.required));
    }
    schema
}

/// All tools, in registration order.
#[must_use]
pub fn list_tools() -> Vec<Tool> {
    definitions()
        .iter()
        .map(|def| {
            let mut tool = Tool::new(def.name, def.description, Arc::new(input_schema(def)));
            tool.annotations = Some(annotations_for(def.method.as_ref()));
            tool
        })
        .collect()
}

/// Execute a tool by name.
///
/// # Errors
///
/// Returns [`CatalogError`] for an unknown tool or arguments that do not fit its schema. Policy
/// denials and GitHub failures are reported inside the returned [`CallToolResult`].
pub async fn call_tool(
    state: &AppState,
    name: &str,
    arguments: &JsonObject,
) -> Result<CallToolResult, CatalogError> {
    let args = Args::new(arguments);
    let outcome = match name {
        "set_default_repo" => repos::set_default_repo(state, &args),
        "get_default_repo" => repos::get_default_repo(state),
        "get_repository" => repos::get_repository(state, &args).await,
        "list_user_repos" => repos::list_user_repos(state, &args).await,
        "create_repository" => repos::create_repository(state, &args).await,
        "delete_repository" => repos::delete_repository(state, &args).await,
        "list_languages" => repos::list_languages(state, &args).await,
        "list_contributors" => repos::list_contributors(state, &args).await,
        "fork_repository" => repos::fork_repository(state, &args).await,
        "list_forks" => repos::list_forks(state, &args).await,
        "get_file_content" => files::get_file_content(state, &args).await,
        "get_directory_content" => files::get_directory_content(state, &args).await,
        "create_file" => files::create_file(state, &args).await,
        "update_file" => files::update_file(state, &args).await,
        "delete_file" => files::delete_file(state, &args).await,
        "list_branches" => branches::list_branches(state, &args).await,
        "get_branch" => branches::get_branch(state, &args).await,
        "create_branch" => branches::create_branch(state, &args).await,
        "delete_branch" => branches::delete_branch(state, &args).await,
        "list_commits" => branches::list_commits(state, &args).await,
        "get_commit" => branches::get_commit(state, &args).await,
        "compare_branches" => branches::compare_branches(state, &args).await,
        "list_issues" => issues::list_issues(state, &args).await,
        "get_issue" => issues::get_issue(state, &args).await,
        "create_issue" => issues::create_issue(state, &args).await,
        "update_issue" => issues::update_issue(state, &args).await,
        "close_issue" => issues::close_issue(state, &args).await,
        "list_issue_comments" => issues::list_issue_comments(state, &args).await,
        "create_issue_comment" => issues::create_issue_comment(state, &args).await,
        "list_labels" => issues::list_labels(state, &args).await,
        "add_labels" => issues::add_labels(state, &args).await,
        "list_pull_requests" => pulls::list_pull_requests(state, &args).await,
        "get_pull_request" => pulls::get_pull_request(state, &args).await,
        "create_pull_request" => pulls::create_pull_request(state, &args).await,
        "update_pull_request" => pulls::update_pull_request(state, &args).await,
        "merge_pull_request" => pulls::merge_pull_request(state, &args).await,
        "list_pr_commits" => pulls::list_pr_commits(state, &args).await,
        "list_pr_files" => pulls::list_pr_files(state, &args).await,
        "create_pr_review" => pulls::create_pr_review(state, &args).await,
        "list_pr_comments" => pulls::list_pr_comments(state, &args).await,
        "get_authenticated_user" => users::get_authenticated_user(state).await,
        "get_user" => users::get_user(state, &args).await,
        "list_followers" => users::list_followers(state, &args).await,
        "list_following" => users::list_following(state, &args).await,
        "list_user_organizations" => users::list_user_organizations(state, &args).await,
        "search_code" => search::search_code(state, &args).await,
        "search_repositories" => search::search_repositories(state, &args).await,
        "search_issues" => search::search_issues(state, &args).await,
        "list_workflows" => actions::list_workflows(state, &args).await,
        "get_workflow" => actions::get_workflow(state, &args).await,
        "trigger_workflow" => actions::trigger_workflow(state, &args).await,
        "list_workflow_runs" => actions::list_workflow_runs(state, &args).await,
        "get_workflow_run" => actions::get_workflow_run(state, &args).await,
        "cancel_workflow_run" => actions::cancel_workflow_run(state, &args).await,
        "rerun_workflow" => actions::rerun_workflow(state, &args).await,
        "list_workflow_jobs" => actions::list_workflow_jobs(state, &args).await,
        "get_workflow_logs_url" => actions::get_workflow_logs_url(state, &args),
        "list_gists" => gists::list_gists(state, &args).await,
        "get_gist" => gists::get_gist(state, &args).await,
        "create_gist" => gists::create_gist(state, &args).await,
        "create_multi_file_gist" => gists::create_multi_file_gist(state, &args).await,
        "update_gist" => gists::update_gist(state, &args).await,
        "delete_gist" => gists::delete_gist(state, &args).await,
        _ => return Err(CatalogError::UnknownTool(name.to_string())),
    };

    render(name, outcome)
}

fn render(name: &str, outcome: ToolOutcome) -> Result<CallToolResult, CatalogError> {
    match outcome {
        Ok(value) => Ok(success(&value)),
        Err(ToolError::Arguments(message)) => Err(CatalogError::InvalidArguments {
            tool: name.to_string(),
            message,
        }),
        Err(ToolError::Policy(e)) => {
            tracing::info!(tool = name, reason = %e, "tool call refused by access policy");
            Ok(success(&json!({ "error": e.to_string() })))
        }
        Err(ToolError::Refused(message)) => Ok(success(&json!({ "error": message }))),
        Err(ToolError::GitHub(e)) => {
            tracing::warn!(tool = name, category = e.category(), error = %e, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(github_error_line(
                &e,
            ))]))
        }
        Err(ToolError::Internal(message)) => {
            tracing::error!(tool = name, error = %message, "tool result could not be rendered");
            Ok(CallToolResult::error(vec![Content::text(format!(
                "Internal error: {message}"
            ))]))
        }
    }
}

fn success(value: &Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

/// One-line rendering of a GitHub failure for the caller.
#[must_use]
pub fn github_error_line(e: &ClientError) -> String {
    match e.status() {
        Some(status) => format!("GitHub API error {status}: {e}"),
        None => e.to_string(),
    }
}

/// Resolve and authorize a single-repository target.
pub(crate) fn repo_target(state: &AppState, args: &Args<'_>) -> Result<Target, ToolError> {
    let target = state
        .policy
        .resolve(args.opt_str("owner")?, args.opt_str("repo")?)?;
    if target.repo.is_empty() {
        return Err(ToolError::Policy(PolicyError::Configuration(
            "Repository is not specified and GH_DEFAULT_REPO is not set".to_string(),
        )));
    }
    state.policy.authorize(&target)?;
    Ok(target)
}

pub(crate) fn to_value<T: Serialize>(value: &T) -> ToolOutcome {
    serde_json::to_value(value).map_err(|e| ToolError::Internal(e.to_string()))
}

/// Shared `owner`/`repo` properties of single-repository tools.
pub(crate) fn target_properties(extra: Value) -> Value {
    properties([
        json!({
            "owner": {
                "type": "string",
                "description": "Repository owner (defaults to the runtime or configured default owner)"
            },
            "repo": {
                "type": "string",
                "description": "Repository name (defaults to the runtime or configured default repository)"
            }
        }),
        extra,
    ])
}

pub(crate) fn page_properties() -> Value {
    json!({
        "per_page": { "type": "integer", "minimum": 1, "maximum": 100, "default": 30 },
        "page": { "type": "integer", "minimum": 1, "default": 1 }
    })
}

/// Merge several property maps into one.
pub(crate) fn properties(parts: impl IntoIterator<Item = Value>) -> Value {
    let mut out = serde_json::Map::new();
    for part in parts {
        if let Value::Object(map) = part {
            out.extend(map);
        }
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique_and_schemas_are_objects() {
        let tools = list_tools();
        let names: HashSet<_> = tools.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names.len(), tools.len());
        for t in &tools {
            assert_eq!(t.input_schema.get("type"), Some(&json!("object")), "{}", t.name);
            let props = t.input_schema.get("properties").and_then(Value::as_object);
            assert!(props.is_some(), "{} has no properties", t.name);
            if let Some(required) = t.input_schema.get("required").and_then(Value::as_array) {
                for r in required {
                    let r = r.as_str().unwrap();
                    assert!(props.unwrap().contains_key(r), "{}: {r}", t.name);
                }
            }
        }
    }

    #[test]
    fn every_listed_tool_is_dispatchable() {
        let listed: HashSet<_> = list_tools().iter().map(|t| t.name.to_string()).collect();
        for name in [
            "set_default_repo",
            "get_default_repo",
            "get_repository",
            "list_user_repos",
            "create_repository",
            "delete_repository",
            "list_languages",
            "list_contributors",
            "fork_repository",
            "list_forks",
            "get_file_content",
            "get_directory_content",
            "create_file",
            "update_file",
            "delete_file",
            "list_branches",
            "get_branch",
            "create_branch",
            "delete_branch",
            "list_commits",
            "get_commit",
            "compare_branches",
            "list_issues",
            "get_issue",
            "create_issue",
            "update_issue",
            "close_issue",
            "list_issue_comments",
            "create_issue_comment",
            "list_labels",
            "add_labels",
            "list_pull_requests",
            "get_pull_request",
            "create_pull_request",
            "update_pull_request",
            "merge_pull_request",
            "list_pr_commits",
            "list_pr_files",
            "create_pr_review",
            "list_pr_comments",
            "get_authenticated_user",
            "get_user",
            "list_followers",
            "list_following",
            "list_user_organizations",
            "search_code",
            "search_repositories",
            "search_issues",
            "list_workflows",
            "get_workflow",
            "trigger_workflow",
            "list_workflow_runs",
            "get_workflow_run",
            "cancel_workflow_run",
            "rerun_workflow",
            "list_workflow_jobs",
            "get_workflow_logs_url",
            "list_gists",
            "get_gist",
            "create_gist",
            "create_multi_file_gist",
            "update_gist",
            "delete_gist",
        ] {
            assert!(listed.contains(name), "{name} is not listed");
        }
        assert_eq!(listed.len(), 63);
    }

    #[test]
    fn unserializable_results_are_internal_errors() {
        let mut keyed = std::collections::BTreeMap::new();
        keyed.insert((1u8, 2u8), "tuple keys are not JSON object keys");
        let err = to_value(&keyed).unwrap_err();
        assert!(matches!(err, ToolError::Internal(_)), "{err:?}");

        let result = render("get_repository", Err(err)).unwrap();
        assert_eq!(result.is_error, Some(true));
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
        assert!(text.starts_with("Internal error: "), "{text}");
        assert!(!text.contains("GitHub"), "{text}");
    }

    #[test]
    fn annotations_follow_the_github_method() {
        let tools = list_tools();
        let find = |n: &str| {
            tools
                .iter()
                .find(|t| t.name == n)
                .and_then(|t| t.annotations.clone())
                .unwrap()
        };
        assert_eq!(find("get_repository").read_only_hint, Some(true));
        assert_eq!(find("delete_repository").destructive_hint, Some(true));
        assert_eq!(find("create_issue").idempotent_hint, Some(false));
        assert_eq!(find("close_issue").idempotent_hint, None);
        assert_eq!(find("set_default_repo").open_world_hint, Some(false));
    }

    #[test]
    fn github_errors_render_status() {
        let e = ClientError::Api {
            status: 404,
            message: "Not Found".into(),
        };
        assert_eq!(github_error_line(&e), "GitHub API error 404: Not Found");
        let e = ClientError::Timeout("deadline".into());
        assert_eq!(
            github_error_line(&e),
            "GitHub API request timed out: deadline"
        );
    }
}
