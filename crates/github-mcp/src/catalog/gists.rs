use super::args::Args;
use super::{ToolDef, ToolError, ToolOutcome, page_properties, properties};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use unrelated_github_client::api::{GistFile, GistPatch, NewGist};
use unrelated_github_client::models::Gist;

// Gists belong to accounts, not repositories, so the allow-list does not apply to them.

pub(super) fn tools() -> Vec<ToolDef> {
    let gist_id = json!({ "type": "string" });
    vec![
        ToolDef {
            name: "list_gists",
            description: "List gists of the authenticated user, or of `username`.",
            method: Some(Method::GET),
            properties: properties([
                json!({ "username": { "type": "string" } }),
                page_properties(),
            ]),
            required: &[],
        },
        ToolDef {
            name: "get_gist",
            description: "Get a gist with the content of its files.",
            method: Some(Method::GET),
            properties: json!({ "gist_id": gist_id.clone() }),
            required: &["gist_id"],
        },
        ToolDef {
            name: "create_gist",
            description: "Create a single-file gist. Gists are secret unless `public` is set.",
            method: Some(Method::POST),
            properties: json!({
                "filename": { "type": "string" },
                "content": { "type": "string" },
                "description": { "type": "string", "default": "" },
                "public": { "type": "boolean", "default": false }
            }),
            required: &["filename", "content"],
        },
        ToolDef {
            name: "create_multi_file_gist",
            description: "Create a gist from several files given as `{\"name\": {\"content\": \"...\"}}`.",
            method: Some(Method::POST),
            properties: json!({
                "files_json": {
                    "type": ["object", "string"],
                    "description": "Files keyed by name, as an object or a JSON string"
                },
                "description": { "type": "string", "default": "" },
                "public": { "type": "boolean", "default": false }
            }),
            required: &["files_json"],
        },
        ToolDef {
            name: "update_gist",
            description: "Change a gist's description and/or replace the content of one file.",
            method: Some(Method::PATCH),
            properties: json!({
                "gist_id": gist_id.clone(),
                "filename": { "type": "string" },
                "content": { "type": "string" },
                "description": { "type": "string" }
            }),
            required: &["gist_id"],
        },
        ToolDef {
            name: "delete_gist",
            description: "Delete a gist. This cannot be undone.",
            method: Some(Method::DELETE),
            properties: json!({ "gist_id": gist_id }),
            required: &["gist_id"],
        },
    ]
}

fn file_names(gist: &Gist) -> Vec<&str> {
    gist.files.keys().map(String::as_str).collect()
}

/// `{"name": {"content": "..."}}` into gist files. Every entry needs string content.
fn parse_files(files: serde_json::Map<String, Value>) -> Result<BTreeMap<String, GistFile>, ToolError> {
    if files.is_empty() {
        return Err(ToolError::Refused("'files_json' must name at least one file".to_string()));
    }
    files
        .into_iter()
        .map(|(name, file)| match file["content"].as_str() {
            Some(content) => Ok((name, GistFile::text(content))),
            None => Err(ToolError::Refused(format!(
                "File {name} in 'files_json' has no string 'content'"
            ))),
        })
        .collect()
}

pub(super) async fn list_gists(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let gists = state
        .github
        .list_gists(args.non_empty_str("username")?, args.page()?)
        .await?;
    Ok(Value::Array(
        gists
            .iter()
            .map(|g| {
                json!({
                    "id": g.id,
                    "description": g.description,
                    "public": g.public,
                    "html_url": g.html_url,
                    "files": file_names(g),
                    "comments": g.comments,
                    "created_at": g.created_at,
                    "updated_at": g.updated_at,
                })
            })
            .collect(),
    ))
}

pub(super) async fn get_gist(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let g = state.github.get_gist(args.required_str("gist_id")?).await?;
    Ok(json!({
        "id": g.id,
        "description": g.description,
        "public": g.public,
        "html_url": g.html_url,
        "owner": g.owner.and_then(|o| o.login),
        "files": g.files,
        "comments": g.comments,
        "created_at": g.created_at,
        "updated_at": g.updated_at,
    }))
}

async fn create(state: &AppState, args: &Args<'_>, files: BTreeMap<String, GistFile>) -> ToolOutcome {
    let new = NewGist {
        description: args.opt_str("description")?.unwrap_or_default().to_string(),
        public: args.bool_or("public", false)?,
        files,
    };
    let g = state.github.create_gist(&new).await?;
    Ok(json!({
        "status": "success",
        "id": g.id,
        "html_url": g.html_url,
        "public": g.public,
        "files": file_names(&g),
    }))
}

pub(super) async fn create_gist(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let files = BTreeMap::from([(
        args.required_str("filename")?.to_string(),
        GistFile::text(args.required_str("content")?),
    )]);
    create(state, args, files).await
}

pub(super) async fn create_multi_file_gist(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let files = args
        .json_object("files_json")?
        .ok_or_else(|| ToolError::Arguments("missing required argument 'files_json'".to_string()))?;
    create(state, args, parse_files(files)?).await
}

pub(super) async fn update_gist(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let files = match (args.non_empty_str("filename")?, args.opt_str("content")?) {
        (Some(name), Some(content)) => Some(BTreeMap::from([(
            name.to_string(),
            GistFile::text(content),
        )])),
        _ => None,
    };
    let patch = GistPatch {
        description: args.opt_str("description")?.map(str::to_string),
        files,
    };
    if patch.description.is_none() && patch.files.is_none() {
        return Err(ToolError::Refused(
            "Nothing to update: pass `description`, or both `filename` and `content`".to_string(),
        ));
    }
    let g = state
        .github
        .update_gist(args.required_str("gist_id")?, &patch)
        .await?;
    Ok(json!({
        "status": "success",
        "id": g.id,
        "html_url": g.html_url,
        "files": file_names(&g),
    }))
}

pub(super) async fn delete_gist(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let id = args.required_str("gist_id")?;
    state.github.delete_gist(id).await?;
    tracing::warn!(gist = id, "gist deleted");
    Ok(json!({
        "status": "success",
        "message": format!("Gist {id} deleted"),
    }))
}
