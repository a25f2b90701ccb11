use super::args::Args;
use super::{ToolDef, ToolError, ToolOutcome, repo_target, target_properties};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use unrelated_github_client::api::FileWrite;
use unrelated_github_client::models::{Contents, FileCommit};

pub(super) fn tools() -> Vec<ToolDef> {
    let git_ref = json!({ "type": "string", "description": "Branch, tag or commit (defaults to the default branch)" });
    let branch = json!({ "type": "string", "description": "Branch to commit to (defaults to the default branch)" });
    vec![
        ToolDef {
            name: "get_file_content",
            description: "Read a file. Text content is returned decoded.",
            method: Some(Method::GET),
            properties: target_properties(json!({
                "path": { "type": "string" },
                "ref": git_ref.clone(),
            })),
            required: &["path"],
        },
        ToolDef {
            name: "get_directory_content",
            description: "List a directory. An empty path lists the repository root.",
            method: Some(Method::GET),
            properties: target_properties(json!({
                "path": { "type": "string", "default": "" },
                "ref": git_ref.clone(),
            })),
            required: &[],
        },
        ToolDef {
            name: "create_file",
            description: "Create a file with a commit.",
            method: Some(Method::PUT),
            properties: target_properties(json!({
                "path": { "type": "string" },
                "content": { "type": "string", "description": "Plain-text file content" },
                "message": { "type": "string", "description": "Commit message" },
                "branch": branch.clone(),
            })),
            required: &["path", "content", "message"],
        },
        ToolDef {
            name: "update_file",
            description: "Replace a file's content with a commit. `sha` is the current blob sha from get_file_content.",
            method: Some(Method::PUT),
            properties: target_properties(json!({
                "path": { "type": "string" },
                "content": { "type": "string", "description": "New plain-text file content" },
                "message": { "type": "string", "description": "Commit message" },
                "sha": { "type": "string" },
                "branch": branch.clone(),
            })),
            required: &["path", "content", "message", "sha"],
        },
        ToolDef {
            name: "delete_file",
            description: "Delete a file with a commit. `sha` is the current blob sha from get_file_content.",
            method: Some(Method::DELETE),
            properties: target_properties(json!({
                "path": { "type": "string" },
                "message": { "type": "string", "description": "Commit message" },
                "sha": { "type": "string" },
                "branch": branch.clone(),
            })),
            required: &["path", "message", "sha"],
        },
    ]
}

fn commit_summary(result: &FileCommit) -> Value {
    let content = result.content.clone().unwrap_or_default();
    json!({
        "status": "success",
        "path": content.path,
        "sha": content.sha,
        "html_url": content.html_url,
        "commit_sha": result.commit.sha,
        "commit_message": result.commit.message,
    })
}

pub(super) async fn get_file_content(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let path = args.required_str("path")?;
    match state
        .github
        .get_contents(&t.owner, &t.repo, path, args.non_empty_str("ref")?)
        .await?
    {
        Contents::File(file) => Ok(json!({
            "name": file.name,
            "path": file.path,
            "sha": file.sha,
            "size": file.size,
            "encoding": file.encoding,
            "content": file.content,
            "html_url": file.html_url,
            "download_url": file.download_url,
        })),
        Contents::Directory(_) => Err(ToolError::Refused(format!(
            "Path {path} is a directory; use get_directory_content"
        ))),
    }
}

pub(super) async fn get_directory_content(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let path = args.opt_str("path")?.unwrap_or_default();
    match state
        .github
        .get_contents(&t.owner, &t.repo, path, args.non_empty_str("ref")?)
        .await?
    {
        Contents::Directory(entries) => Ok(Value::Array(
            entries
                .into_iter()
                .map(|e| {
                    json!({
                        "name": e.name,
                        "path": e.path,
                        "type": e.entry_type,
                        "size": e.size,
                        "sha": e.sha,
                        "html_url": e.html_url,
                    })
                })
                .collect(),
        )),
        Contents::File(_) => Err(ToolError::Refused(format!(
            "Path {path} is a file; use get_file_content"
        ))),
    }
}

pub(super) async fn create_file(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let write = FileWrite {
        message: args.required_str("message")?.to_string(),
        content: args.required_str("content")?.to_string(),
        sha: None,
        branch: args.non_empty_str("branch")?.map(str::to_string),
    };
    let result = state
        .github
        .put_file(&t.owner, &t.repo, args.required_str("path")?, &write)
        .await?;
    Ok(commit_summary(&result))
}

pub(super) async fn update_file(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let write = FileWrite {
        message: args.required_str("message")?.to_string(),
        content: args.required_str("content")?.to_string(),
        sha: Some(args.required_str("sha")?.to_string()),
        branch: args.non_empty_str("branch")?.map(str::to_string),
    };
    let result = state
        .github
        .put_file(&t.owner, &t.repo, args.required_str("path")?, &write)
        .await?;
    Ok(commit_summary(&result))
}

pub(super) async fn delete_file(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let path = args.required_str("path")?;
    let result = state
        .github
        .delete_file(
            &t.owner,
            &t.repo,
            path,
            args.required_str("message")?,
            args.required_str("sha")?,
            args.non_empty_str("branch")?,
        )
        .await?;
    Ok(json!({
        "status": "success",
        "message": format!("File {path} deleted"),
        "commit_sha": result.commit.sha,
    }))
}
