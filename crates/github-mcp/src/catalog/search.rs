use super::args::Args;
use super::{ToolDef, ToolOutcome, page_properties, properties};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};

// Search spans all of GitHub, so results are not filtered by the allow-list.

pub(super) fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "search_code",
            description: "Search code, e.g. `addClass in:file language:js repo:acme/widgets`.",
            method: Some(Method::GET),
            properties: properties([
                json!({ "query": { "type": "string" } }),
                page_properties(),
            ]),
            required: &["query"],
        },
        ToolDef {
            name: "search_repositories",
            description: "Search repositories, e.g. `tetris language:rust stars:>100`.",
            method: Some(Method::GET),
            properties: properties([
                json!({
                    "query": { "type": "string" },
                    "sort": { "type": "string", "enum": ["stars", "forks", "help-wanted-issues", "updated"], "default": "stars" }
                }),
                page_properties(),
            ]),
            required: &["query"],
        },
        ToolDef {
            name: "search_issues",
            description: "Search issues and pull requests, e.g. `is:pr is:merged author:octocat` or `repo:acme/widgets label:bug`.",
            method: Some(Method::GET),
            properties: properties([
                json!({
                    "query": { "type": "string" },
                    "sort": { "type": "string", "enum": ["created", "updated", "comments"], "default": "created" }
                }),
                page_properties(),
            ]),
            required: &["query"],
        },
    ]
}

pub(super) async fn search_code(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let results = state
        .github
        .search_code(args.required_str("query")?, args.page()?)
        .await?;
    Ok(json!({
        "total_count": results.total_count,
        "items": results.items.into_iter().map(|i| json!({
            "name": i.name,
            "path": i.path,
            "repository": i.repository.full_name,
            "html_url": i.html_url,
        })).collect::<Vec<Value>>(),
    }))
}

pub(super) async fn search_repositories(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let results = state
        .github
        .search_repositories(
            args.required_str("query")?,
            args.str_or("sort", "stars")?,
            args.page()?,
        )
        .await?;
    Ok(json!({
        "total_count": results.total_count,
        "items": results.items.into_iter().map(|r| json!({
            "full_name": r.full_name,
            "description": r.description,
            "html_url": r.html_url,
            "language": r.language,
            "stargazers_count": r.stargazers_count,
            "forks_count": r.forks_count,
        })).collect::<Vec<Value>>(),
    }))
}

pub(super) async fn search_issues(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let results = state
        .github
        .search_issues(
            args.required_str("query")?,
            args.str_or("sort", "created")?,
            args.page()?,
        )
        .await?;
    Ok(json!({
        "total_count": results.total_count,
        "items": results.items.into_iter().map(|i| json!({
            "number": i.number,
            "title": i.title,
            "state": i.state,
            "html_url": i.html_url,
            "repository_url": i.repository_url,
            "author": i.user.and_then(|u| u.login),
            "labels": i.labels.into_iter().filter_map(|l| l.name).collect::<Vec<_>>(),
            "created_at": i.created_at,
            "is_pull_request": i.pull_request.is_some(),
        })).collect::<Vec<Value>>(),
    }))
}
