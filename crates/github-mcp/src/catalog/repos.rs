use super::args::Args;
use super::{
    ToolDef, ToolError, ToolOutcome, page_properties, properties, repo_target, target_properties,
    to_value,
};
use crate::policy::{PolicyError, Target};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use unrelated_github_client::api::{ForkRequest, NewRepository};

pub(super) fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "set_default_repo",
            description: "Set the repository used when a tool call omits `repo`. Lasts until the server restarts.",
            method: None,
            properties: json!({
                "repo": { "type": "string", "description": "Repository name" },
                "owner": { "type": "string", "description": "Repository owner (defaults to GH_DEFAULT_OWNER)" }
            }),
            required: &["repo"],
        },
        ToolDef {
            name: "get_default_repo",
            description: "Show the runtime default, the configured default and the repository a call without `owner`/`repo` would target.",
            method: None,
            properties: json!({}),
            required: &[],
        },
        ToolDef {
            name: "get_repository",
            description: "Get repository details.",
            method: Some(Method::GET),
            properties: target_properties(json!({})),
            required: &[],
        },
        ToolDef {
            name: "list_user_repos",
            description: "List repositories of the authenticated user.",
            method: Some(Method::GET),
            properties: properties([
                json!({
                    "type": { "type": "string", "enum": ["all", "owner", "public", "private", "member"], "default": "all" },
                    "sort": { "type": "string", "enum": ["created", "updated", "pushed", "full_name"], "default": "updated" }
                }),
                page_properties(),
            ]),
            required: &[],
        },
        ToolDef {
            name: "create_repository",
            description: "Create a repository for the authenticated user, or in `org` when given.",
            method: Some(Method::POST),
            properties: json!({
                "name": { "type": "string" },
                "description": { "type": "string", "default": "" },
                "private": { "type": "boolean", "default": false },
                "auto_init": { "type": "boolean", "default": true },
                "org": { "type": "string", "description": "Organization to create the repository in" }
            }),
            required: &["name"],
        },
        ToolDef {
            name: "delete_repository",
            description: "Delete a repository. This cannot be undone.",
            method: Some(Method::DELETE),
            properties: target_properties(json!({})),
            required: &[],
        },
        ToolDef {
            name: "list_languages",
            description: "Bytes of code per language in a repository.",
            method: Some(Method::GET),
            properties: target_properties(json!({})),
            required: &[],
        },
        ToolDef {
            name: "list_contributors",
            description: "List contributors of a repository.",
            method: Some(Method::GET),
            properties: target_properties(page_properties()),
            required: &[],
        },
        ToolDef {
            name: "fork_repository",
            description: "Fork a repository into the authenticated account, or into `organization`.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "organization": { "type": "string", "description": "Organization to fork into" },
                "name": { "type": "string", "description": "Name of the fork (defaults to the source name)" }
            })),
            required: &[],
        },
        ToolDef {
            name: "list_forks",
            description: "List forks of a repository.",
            method: Some(Method::GET),
            properties: target_properties(page_properties()),
            required: &[],
        },
    ]
}

pub(super) fn set_default_repo(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let repo = args.required_str("repo")?.trim();
    if repo.is_empty() {
        return Err(ToolError::Arguments("'repo' must not be empty".to_string()));
    }
    let owner = match args.non_empty_str("owner")? {
        Some(owner) => owner.to_string(),
        None => state
            .policy
            .default_owner()
            .map(str::to_string)
            .ok_or_else(|| {
                PolicyError::Configuration(
                    "GH_DEFAULT_OWNER is not set; pass `owner` explicitly".to_string(),
                )
            })?,
    };

    state.policy.set_runtime_default(&owner, repo)?;
    tracing::info!(owner = %owner, repo, "runtime default repository set");
    Ok(json!({
        "status": "success",
        "message": format!("Default repository set to {owner}/{repo}"),
        "owner": owner,
        "repo": repo,
    }))
}

pub(super) fn get_default_repo(state: &AppState) -> ToolOutcome {
    let effective = state
        .policy
        .resolve(None, None)
        .ok()
        .filter(|t: &Target| !t.repo.is_empty());
    Ok(json!({
        "runtime": state.policy.runtime(),
        "configured": {
            "owner": state.policy.default_owner(),
            "repo": state.policy.default_repo(),
        },
        "effective": effective,
    }))
}

pub(super) async fn get_repository(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    to_value(&state.github.get_repository(&t.owner, &t.repo).await?)
}

pub(super) async fn list_user_repos(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let repos = state
        .github
        .list_user_repos(
            args.str_or("type", "all")?,
            args.str_or("sort", "updated")?,
            args.page()?,
        )
        .await?;
    to_value(&repos)
}

pub(super) async fn create_repository(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let name = args.required_str("name")?;
    let org = args.non_empty_str("org")?;
    if let Some(org) = org {
        state.policy.authorize(&Target {
            owner: org.to_string(),
            repo: name.to_string(),
        })?;
    }

    let new = NewRepository {
        name: name.to_string(),
        description: args.opt_str("description")?.unwrap_or_default().to_string(),
        private: args.bool_or("private", false)?,
        auto_init: args.bool_or("auto_init", true)?,
    };
    to_value(&state.github.create_repository(&new, org).await?)
}

pub(super) async fn delete_repository(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    state.github.delete_repository(&t.owner, &t.repo).await?;
    tracing::warn!(repository = %t.full_name(), "repository deleted");
    Ok(json!({
        "status": "success",
        "message": format!("Repository {} deleted", t.full_name()),
    }))
}

pub(super) async fn list_languages(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    to_value(&state.github.list_languages(&t.owner, &t.repo).await?)
}

pub(super) async fn list_contributors(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    to_value(
        &state
            .github
            .list_contributors(&t.owner, &t.repo, args.page()?)
            .await?,
    )
}

pub(super) async fn fork_repository(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let source = repo_target(state, args)?;
    let fork = ForkRequest {
        organization: args.non_empty_str("organization")?.map(str::to_string),
        name: args.non_empty_str("name")?.map(str::to_string),
    };
    // Like `create_repository`, the destination is only known up front for organizations.
    if let Some(org) = &fork.organization {
        state.policy.authorize(&Target {
            owner: org.clone(),
            repo: fork.name.clone().unwrap_or_else(|| source.repo.clone()),
        })?;
    }

    let created = state
        .github
        .fork_repository(&source.owner, &source.repo, &fork)
        .await?;
    tracing::info!(source = %source.full_name(), fork = ?created.full_name, "fork requested");
    Ok(json!({
        "status": "success",
        "name": created.name,
        "full_name": created.full_name,
        "html_url": created.html_url,
        "clone_url": created.clone_url,
    }))
}

pub(super) async fn list_forks(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let forks = state
        .github
        .list_forks(&t.owner, &t.repo, args.page()?)
        .await?;
    Ok(Value::Array(
        forks
            .into_iter()
            .map(|f| {
                json!({
                    "full_name": f.full_name,
                    "html_url": f.html_url,
                    "created_at": f.created_at,
                })
            })
            .collect(),
    ))
}
