use super::args::Args;
use super::{ToolDef, ToolOutcome, page_properties, properties, repo_target, target_properties};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use unrelated_github_client::api::ListCommits;

pub(super) fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "list_branches",
            description: "List branches of a repository.",
            method: Some(Method::GET),
            properties: target_properties(page_properties()),
            required: &[],
        },
        ToolDef {
            name: "get_branch",
            description: "Get a branch and its head commit.",
            method: Some(Method::GET),
            properties: target_properties(json!({ "branch": { "type": "string" } })),
            required: &["branch"],
        },
        ToolDef {
            name: "create_branch",
            description: "Create a branch from the current head of another branch.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "branch_name": { "type": "string", "description": "Name of the new branch" },
                "from_branch": { "type": "string", "description": "Source branch", "default": "main" }
            })),
            required: &["branch_name"],
        },
        ToolDef {
            name: "delete_branch",
            description: "Delete a branch. This cannot be undone.",
            method: Some(Method::DELETE),
            properties: target_properties(json!({ "branch": { "type": "string" } })),
            required: &["branch"],
        },
        ToolDef {
            name: "list_commits",
            description: "List commits, newest first.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({
                    "sha": { "type": "string", "description": "Branch or commit sha to start from" },
                    "path": { "type": "string", "description": "Only commits touching this path" }
                }),
                page_properties(),
            ])),
            required: &[],
        },
        ToolDef {
            name: "get_commit",
            description: "Get one commit with its change stats.",
            method: Some(Method::GET),
            properties: target_properties(json!({
                "ref": { "type": "string", "description": "Commit sha or branch name" }
            })),
            required: &["ref"],
        },
        ToolDef {
            name: "compare_branches",
            description: "Compare two branches or commits.",
            method: Some(Method::GET),
            properties: target_properties(json!({
                "base": { "type": "string" },
                "head": { "type": "string" }
            })),
            required: &["base", "head"],
        },
    ]
}

/// First line of a commit message.
fn headline(message: Option<&str>) -> &str {
    message.and_then(|m| m.lines().next()).unwrap_or_default()
}

pub(super) fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

pub(super) async fn list_branches(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let branches = state
        .github
        .list_branches(&t.owner, &t.repo, args.page()?)
        .await?;
    Ok(Value::Array(
        branches
            .into_iter()
            .map(|b| {
                json!({
                    "name": b.name,
                    "sha": b.commit.sha,
                    "protected": b.protected,
                })
            })
            .collect(),
    ))
}

pub(super) async fn get_branch(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let b = state
        .github
        .get_branch(&t.owner, &t.repo, args.required_str("branch")?)
        .await?;
    Ok(json!({
        "name": b.name,
        "sha": b.commit.sha,
        "protected": b.protected,
        "html_url": b.commit.html_url,
    }))
}

pub(super) async fn create_branch(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let name = args.required_str("branch_name")?;
    let from = args.str_or("from_branch", "main")?;
    let created = state
        .github
        .create_branch(&t.owner, &t.repo, name, from)
        .await?;
    Ok(json!({
        "status": "success",
        "ref": created.ref_name,
        "sha": created.object.sha,
    }))
}

pub(super) async fn delete_branch(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let branch = args.required_str("branch")?;
    state.github.delete_branch(&t.owner, &t.repo, branch).await?;
    tracing::warn!(repository = %t.full_name(), branch, "branch deleted");
    Ok(json!({
        "status": "success",
        "message": format!("Branch {branch} deleted"),
    }))
}

pub(super) async fn list_commits(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let filter = ListCommits {
        sha: args.non_empty_str("sha")?.map(str::to_string),
        path: args.non_empty_str("path")?.map(str::to_string),
        page: args.page()?,
    };
    let commits = state
        .github
        .list_commits(&t.owner, &t.repo, &filter)
        .await?;
    Ok(Value::Array(
        commits
            .into_iter()
            .map(|c| {
                let author = c.commit.author.unwrap_or_default();
                json!({
                    "sha": c.sha,
                    "message": c.commit.message,
                    "author": author.name,
                    "date": author.date,
                    "html_url": c.html_url,
                })
            })
            .collect(),
    ))
}

pub(super) async fn get_commit(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let c = state
        .github
        .get_commit(&t.owner, &t.repo, args.required_str("ref")?)
        .await?;
    let author = c.commit.author.unwrap_or_default();
    Ok(json!({
        "sha": c.sha,
        "message": c.commit.message,
        "author": author.name,
        "author_email": author.email,
        "date": author.date,
        "html_url": c.html_url,
        "stats": c.stats,
        "files_count": c.files.len(),
    }))
}

pub(super) async fn compare_branches(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let cmp = state
        .github
        .compare_commits(
            &t.owner,
            &t.repo,
            args.required_str("base")?,
            args.required_str("head")?,
        )
        .await?;
    let commits: Vec<Value> = cmp["commits"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .take(10)
        .map(|c| {
            json!({
                "sha": short_sha(c["sha"].as_str().unwrap_or_default()),
                "message": headline(c["commit"]["message"].as_str()),
            })
        })
        .collect();
    Ok(json!({
        "status": cmp["status"],
        "ahead_by": cmp["ahead_by"],
        "behind_by": cmp["behind_by"],
        "total_commits": cmp["total_commits"],
        "html_url": cmp["html_url"],
        "files_changed": cmp["files"].as_array().map_or(0, Vec::len),
        "commits": commits,
    }))
}
