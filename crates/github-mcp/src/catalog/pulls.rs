use super::args::Args;
use super::{ToolDef, ToolOutcome, page_properties, properties, repo_target, target_properties};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use unrelated_github_client::api::{MergeRequest, NewPullRequest, NewReview, PullRequestPatch};
use unrelated_github_client::models::PullRequest;

pub(super) fn tools() -> Vec<ToolDef> {
    let number = json!({ "type": "integer", "minimum": 1 });
    vec![
        ToolDef {
            name: "list_pull_requests",
            description: "List pull requests.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({
                    "state": { "type": "string", "enum": ["open", "closed", "all"], "default": "open" },
                    "base": { "type": "string", "description": "Only pull requests into this branch" }
                }),
                page_properties(),
            ])),
            required: &[],
        },
        ToolDef {
            name: "get_pull_request",
            description: "Get one pull request.",
            method: Some(Method::GET),
            properties: target_properties(json!({ "pull_number": number.clone() })),
            required: &["pull_number"],
        },
        ToolDef {
            name: "create_pull_request",
            description: "Open a pull request from `head` into `base`.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "title": { "type": "string" },
                "head": { "type": "string", "description": "Branch with the changes" },
                "base": { "type": "string", "default": "main" },
                "body": { "type": "string", "default": "" },
                "draft": { "type": "boolean", "default": false }
            })),
            required: &["title", "head"],
        },
        ToolDef {
            name: "update_pull_request",
            description: "Edit a pull request. Omitted fields are left unchanged.",
            method: Some(Method::PATCH),
            properties: target_properties(json!({
                "pull_number": number.clone(),
                "title": { "type": "string" },
                "body": { "type": "string" },
                "state": { "type": "string", "enum": ["open", "closed"] },
                "base": { "type": "string", "description": "New target branch" }
            })),
            required: &["pull_number"],
        },
        ToolDef {
            name: "merge_pull_request",
            description: "Merge a pull request.",
            method: Some(Method::PUT),
            properties: target_properties(json!({
                "pull_number": number.clone(),
                "merge_method": { "type": "string", "enum": ["merge", "squash", "rebase"], "default": "merge" },
                "commit_title": { "type": "string" },
                "commit_message": { "type": "string" }
            })),
            required: &["pull_number"],
        },
        ToolDef {
            name: "list_pr_commits",
            description: "List the commits of a pull request.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({ "pull_number": number.clone() }),
                page_properties(),
            ])),
            required: &["pull_number"],
        },
        ToolDef {
            name: "list_pr_files",
            description: "List the files a pull request changes. Long patches are cut at 500 characters.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({ "pull_number": number.clone() }),
                page_properties(),
            ])),
            required: &["pull_number"],
        },
        ToolDef {
            name: "create_pr_review",
            description: "Submit a review on a pull request.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "pull_number": number.clone(),
                "body": { "type": "string" },
                "event": { "type": "string", "enum": ["APPROVE", "REQUEST_CHANGES", "COMMENT"], "default": "COMMENT" }
            })),
            required: &["pull_number", "body"],
        },
        ToolDef {
            name: "list_pr_comments",
            description: "List review comments on the diff of a pull request.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({ "pull_number": number }),
                page_properties(),
            ])),
            required: &["pull_number"],
        },
    ]
}

const PATCH_PREVIEW: usize = 500;

/// Cut a diff to [`PATCH_PREVIEW`] characters, marking the cut with `...`.
fn preview(patch: Option<String>) -> Option<String> {
    let patch = patch?;
    match patch.char_indices().nth(PATCH_PREVIEW) {
        Some((cut, _)) => Some(format!("{}...", &patch[..cut])),
        None => Some(patch),
    }
}

fn summary(pr: PullRequest) -> Value {
    json!({
        "number": pr.number,
        "title": pr.title,
        "state": pr.state,
        "html_url": pr.html_url,
        "author": pr.user.and_then(|u| u.login),
        "head": pr.head.ref_name,
        "base": pr.base.ref_name,
        "draft": pr.draft,
        "created_at": pr.created_at,
        "updated_at": pr.updated_at,
    })
}

pub(super) async fn list_pull_requests(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let prs = state
        .github
        .list_pull_requests(
            &t.owner,
            &t.repo,
            args.str_or("state", "open")?,
            args.non_empty_str("base")?,
            args.page()?,
        )
        .await?;
    Ok(Value::Array(prs.into_iter().map(summary).collect()))
}

pub(super) async fn get_pull_request(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let pr = state
        .github
        .get_pull_request(&t.owner, &t.repo, args.required_u64("pull_number")?)
        .await?;
    let extra = json!({
        "body": pr.body.clone(),
        "merged": pr.merged,
        "mergeable": pr.mergeable,
        "merged_at": pr.merged_at.clone(),
        "head_sha": pr.head.sha.clone(),
    });
    Ok(properties([summary(pr), extra]))
}

pub(super) async fn create_pull_request(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let new = NewPullRequest {
        title: args.required_str("title")?.to_string(),
        head: args.required_str("head")?.to_string(),
        base: args.str_or("base", "main")?.to_string(),
        body: args.opt_str("body")?.unwrap_or_default().to_string(),
        draft: args.bool_or("draft", false)?,
    };
    let pr = state
        .github
        .create_pull_request(&t.owner, &t.repo, &new)
        .await?;
    Ok(json!({
        "status": "success",
        "number": pr.number,
        "title": pr.title,
        "html_url": pr.html_url,
    }))
}

pub(super) async fn update_pull_request(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let patch = PullRequestPatch {
        title: args.non_empty_str("title")?.map(str::to_string),
        body: args.opt_str("body")?.map(str::to_string),
        state: args.non_empty_str("state")?.map(str::to_string),
        base: args.non_empty_str("base")?.map(str::to_string),
    };
    let pr = state
        .github
        .update_pull_request(&t.owner, &t.repo, args.required_u64("pull_number")?, &patch)
        .await?;
    Ok(json!({
        "status": "success",
        "number": pr.number,
        "title": pr.title,
        "state": pr.state,
        "html_url": pr.html_url,
    }))
}

pub(super) async fn merge_pull_request(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let merge = MergeRequest {
        merge_method: args.str_or("merge_method", "merge")?.to_string(),
        commit_title: args.non_empty_str("commit_title")?.map(str::to_string),
        commit_message: args.non_empty_str("commit_message")?.map(str::to_string),
    };
    let result = state
        .github
        .merge_pull_request(&t.owner, &t.repo, args.required_u64("pull_number")?, &merge)
        .await?;
    Ok(json!({
        "merged": result.merged,
        "sha": result.sha,
        "message": result.message,
    }))
}

pub(super) async fn list_pr_commits(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let commits = state
        .github
        .list_pull_request_commits(&t.owner, &t.repo, args.required_u64("pull_number")?, args.page()?)
        .await?;
    Ok(Value::Array(
        commits
            .into_iter()
            .map(|c| {
                let author = c.commit.author.unwrap_or_default();
                json!({
                    "sha": c.sha,
                    "message": c.commit.message.as_deref().and_then(|m| m.lines().next()),
                    "author": author.name,
                    "date": author.date,
                })
            })
            .collect(),
    ))
}

pub(super) async fn list_pr_files(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let files = state
        .github
        .list_pull_request_files(&t.owner, &t.repo, args.required_u64("pull_number")?, args.page()?)
        .await?;
    Ok(Value::Array(
        files
            .into_iter()
            .map(|f| {
                json!({
                    "filename": f.filename,
                    "status": f.status,
                    "additions": f.additions,
                    "deletions": f.deletions,
                    "changes": f.changes,
                    "patch": preview(f.patch),
                })
            })
            .collect(),
    ))
}

pub(super) async fn create_pr_review(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let review = NewReview {
        body: args.required_str("body")?.to_string(),
        event: args.str_or("event", "COMMENT")?.to_ascii_uppercase(),
    };
    let created = state
        .github
        .create_review(&t.owner, &t.repo, args.required_u64("pull_number")?, &review)
        .await?;
    Ok(json!({
        "status": "success",
        "id": created.id,
        "state": created.state,
        "html_url": created.html_url,
    }))
}

pub(super) async fn list_pr_comments(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let comments = state
        .github
        .list_review_comments(&t.owner, &t.repo, args.required_u64("pull_number")?, args.page()?)
        .await?;
    Ok(Value::Array(
        comments
            .into_iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "body": c.body,
                    "path": c.path,
                    "line": c.line,
                    "author": c.user.and_then(|u| u.login),
                    "created_at": c.created_at,
                    "html_url": c.html_url,
                })
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_patches_are_cut() {
        assert_eq!(preview(None), None);
        assert_eq!(preview(Some("@@ -1 +1 @@".into())).as_deref(), Some("@@ -1 +1 @@"));

        let long = "é".repeat(PATCH_PREVIEW + 20);
        let cut = preview(Some(long)).unwrap();
        assert_eq!(cut.chars().count(), PATCH_PREVIEW + 3);
        assert!(cut.ends_with("..."));
    }
}
