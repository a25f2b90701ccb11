use super::args::Args;
use super::{
    ToolDef, ToolError, ToolOutcome, page_properties, properties, repo_target, target_properties,
};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use unrelated_github_client::api::{IssueFilter, IssuePatch, NewIssue};
use unrelated_github_client::models::Issue;

pub(super) fn tools() -> Vec<ToolDef> {
    let number = json!({ "type": "integer", "minimum": 1 });
    vec![
        ToolDef {
            name: "list_issues",
            description: "List issues (pull requests excluded).",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({
                    "state": { "type": "string", "enum": ["open", "closed", "all"], "default": "open" },
                    "labels": { "type": "string", "description": "Comma-separated label names" },
                    "assignee": { "type": "string" }
                }),
                page_properties(),
            ])),
            required: &[],
        },
        ToolDef {
            name: "get_issue",
            description: "Get one issue.",
            method: Some(Method::GET),
            properties: target_properties(json!({ "issue_number": number.clone() })),
            required: &["issue_number"],
        },
        ToolDef {
            name: "create_issue",
            description: "Open an issue.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "title": { "type": "string" },
                "body": { "type": "string", "default": "" },
                "labels": { "type": "array", "items": { "type": "string" } },
                "assignees": { "type": "array", "items": { "type": "string" } }
            })),
            required: &["title"],
        },
        ToolDef {
            name: "update_issue",
            description: "Edit an issue. Omitted fields are left unchanged.",
            method: Some(Method::PATCH),
            properties: target_properties(json!({
                "issue_number": number.clone(),
                "title": { "type": "string" },
                "body": { "type": "string" },
                "state": { "type": "string", "enum": ["open", "closed"] },
                "labels": { "type": "array", "items": { "type": "string" }, "description": "Replaces the label set" },
                "assignees": { "type": "array", "items": { "type": "string" }, "description": "Replaces the assignees" }
            })),
            required: &["issue_number"],
        },
        ToolDef {
            name: "close_issue",
            description: "Close an issue.",
            method: Some(Method::PATCH),
            properties: target_properties(json!({ "issue_number": number.clone() })),
            required: &["issue_number"],
        },
        ToolDef {
            name: "list_issue_comments",
            description: "List comments on an issue or pull request.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({ "issue_number": number.clone() }),
                page_properties(),
            ])),
            required: &["issue_number"],
        },
        ToolDef {
            name: "create_issue_comment",
            description: "Comment on an issue or pull request.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "issue_number": number.clone(),
                "body": { "type": "string" }
            })),
            required: &["issue_number", "body"],
        },
        ToolDef {
            name: "list_labels",
            description: "List the labels defined in a repository.",
            method: Some(Method::GET),
            properties: target_properties(json!({})),
            required: &[],
        },
        ToolDef {
            name: "add_labels",
            description: "Add labels to an issue or pull request.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "issue_number": number,
                "labels": { "type": "array", "items": { "type": "string" } }
            })),
            required: &["issue_number", "labels"],
        },
    ]
}

fn summary(issue: Issue) -> Value {
    json!({
        "number": issue.number,
        "title": issue.title,
        "state": issue.state,
        "html_url": issue.html_url,
        "author": issue.user.and_then(|u| u.login),
        "labels": issue.labels.into_iter().filter_map(|l| l.name).collect::<Vec<_>>(),
        "assignees": issue.assignees.into_iter().filter_map(|a| a.login).collect::<Vec<_>>(),
        "comments": issue.comments,
        "created_at": issue.created_at,
        "updated_at": issue.updated_at,
    })
}

pub(super) async fn list_issues(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let filter = IssueFilter {
        state: Some(args.str_or("state", "open")?.to_string()),
        labels: args.non_empty_str("labels")?.map(str::to_string),
        assignee: args.non_empty_str("assignee")?.map(str::to_string),
        page: args.page()?,
    };
    let issues = state.github.list_issues(&t.owner, &t.repo, &filter).await?;
    Ok(Value::Array(
        issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .map(summary)
            .collect(),
    ))
}

pub(super) async fn get_issue(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let issue = state
        .github
        .get_issue(&t.owner, &t.repo, args.required_u64("issue_number")?)
        .await?;
    let closed_at = issue.closed_at.clone();
    let body = issue.body.clone();
    let mut v = summary(issue);
    if let Some(obj) = v.as_object_mut() {
        obj.insert("body".to_string(), json!(body));
        obj.insert("closed_at".to_string(), json!(closed_at));
    }
    Ok(v)
}

pub(super) async fn create_issue(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let new = NewIssue {
        title: args.required_str("title")?.to_string(),
        body: args.opt_str("body")?.unwrap_or_default().to_string(),
        labels: args.string_list("labels")?,
        assignees: args.string_list("assignees")?,
    };
    let issue = state.github.create_issue(&t.owner, &t.repo, &new).await?;
    Ok(json!({
        "status": "success",
        "number": issue.number,
        "title": issue.title,
        "html_url": issue.html_url,
    }))
}

pub(super) async fn update_issue(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let patch = IssuePatch {
        title: args.non_empty_str("title")?.map(str::to_string),
        body: args.opt_str("body")?.map(str::to_string),
        state: args.non_empty_str("state")?.map(str::to_string),
        labels: args.opt_string_list("labels")?,
        assignees: args.opt_string_list("assignees")?,
    };
    let issue = state
        .github
        .update_issue(&t.owner, &t.repo, args.required_u64("issue_number")?, &patch)
        .await?;
    Ok(json!({
        "status": "success",
        "number": issue.number,
        "title": issue.title,
        "state": issue.state,
        "html_url": issue.html_url,
    }))
}

pub(super) async fn close_issue(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let number = args.required_u64("issue_number")?;
    let patch = IssuePatch {
        state: Some("closed".to_string()),
        ..IssuePatch::default()
    };
    let issue = state
        .github
        .update_issue(&t.owner, &t.repo, number, &patch)
        .await?;
    Ok(json!({
        "status": "success",
        "message": format!("Issue #{number} closed"),
        "html_url": issue.html_url,
    }))
}

pub(super) async fn list_issue_comments(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let comments = state
        .github
        .list_issue_comments(
            &t.owner,
            &t.repo,
            args.required_u64("issue_number")?,
            args.page()?,
        )
        .await?;
    Ok(Value::Array(
        comments
            .into_iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "body": c.body,
                    "author": c.user.and_then(|u| u.login),
                    "created_at": c.created_at,
                    "html_url": c.html_url,
                })
            })
            .collect(),
    ))
}

pub(super) async fn create_issue_comment(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let comment = state
        .github
        .create_issue_comment(
            &t.owner,
            &t.repo,
            args.required_u64("issue_number")?,
            args.required_str("body")?,
        )
        .await?;
    Ok(json!({
        "status": "success",
        "id": comment.id,
        "html_url": comment.html_url,
    }))
}

pub(super) async fn list_labels(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let labels = state.github.list_labels(&t.owner, &t.repo).await?;
    Ok(Value::Array(
        labels
            .into_iter()
            .map(|l| {
                json!({
                    "name": l.name,
                    "color": l.color,
                    "description": l.description,
                })
            })
            .collect(),
    ))
}

pub(super) async fn add_labels(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let wanted = args.string_list("labels")?;
    if wanted.is_empty() {
        return Err(ToolError::Arguments("'labels' must name at least one label".to_string()));
    }
    let labels = state
        .github
        .add_labels(&t.owner, &t.repo, args.required_u64("issue_number")?, &wanted)
        .await?;
    Ok(json!({
        "status": "success",
        "labels": labels.into_iter().filter_map(|l| l.name).collect::<Vec<_>>(),
    }))
}
