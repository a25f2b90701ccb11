use super::args::Args;
use super::{ToolDef, ToolOutcome, page_properties, properties, to_value};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use unrelated_github_client::models::Account;

pub(super) fn tools() -> Vec<ToolDef> {
    let scoped = || {
        properties([
            json!({ "username": { "type": "string", "description": "Defaults to the authenticated user" } }),
            page_properties(),
        ])
    };
    vec![
        ToolDef {
            name: "get_authenticated_user",
            description: "Profile of the user the GitHub token belongs to.",
            method: Some(Method::GET),
            properties: json!({}),
            required: &[],
        },
        ToolDef {
            name: "get_user",
            description: "Public profile of a GitHub user.",
            method: Some(Method::GET),
            properties: json!({ "username": { "type": "string" } }),
            required: &["username"],
        },
        ToolDef {
            name: "list_followers",
            description: "Accounts following a user.",
            method: Some(Method::GET),
            properties: scoped(),
            required: &[],
        },
        ToolDef {
            name: "list_following",
            description: "Accounts a user follows.",
            method: Some(Method::GET),
            properties: scoped(),
            required: &[],
        },
        ToolDef {
            name: "list_user_organizations",
            description: "Organizations a user belongs to.",
            method: Some(Method::GET),
            properties: scoped(),
            required: &[],
        },
    ]
}

fn accounts(list: Vec<Account>) -> Value {
    Value::Array(
        list.into_iter()
            .map(|a| {
                json!({
                    "login": a.login,
                    "html_url": a.html_url,
                    "avatar_url": a.avatar_url,
                })
            })
            .collect(),
    )
}

pub(super) async fn get_authenticated_user(state: &AppState) -> ToolOutcome {
    to_value(&state.github.get_authenticated_user().await?)
}

pub(super) async fn get_user(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    to_value(&state.github.get_user(args.required_str("username")?).await?)
}

pub(super) async fn list_followers(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let username = args.non_empty_str("username")?;
    Ok(accounts(state.github.list_followers(username, args.page()?).await?))
}

pub(super) async fn list_following(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let username = args.non_empty_str("username")?;
    Ok(accounts(state.github.list_following(username, args.page()?).await?))
}

pub(super) async fn list_user_organizations(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let orgs = state
        .github
        .list_user_orgs(args.non_empty_str("username")?, args.page()?)
        .await?;
    Ok(Value::Array(
        orgs.into_iter()
            .map(|o| {
                let html_url = o.login.as_ref().map(|l| format!("https://github.com/{l}"));
                json!({
                    "login": o.login,
                    "description": o.description,
                    "html_url": html_url,
                    "avatar_url": o.avatar_url,
                })
            })
            .collect(),
    ))
}
