use super::args::Args;
use super::branches::short_sha;
use super::{ToolDef, ToolOutcome, page_properties, properties, repo_target, target_properties};
use crate::state::AppState;
use reqwest::Method;
use serde_json::{Value, json};
use unrelated_github_client::api::{RunFilter, WorkflowDispatch};

pub(super) fn tools() -> Vec<ToolDef> {
    let workflow = json!({
        "type": ["integer", "string"],
        "description": "Workflow id or file name, e.g. `ci.yml`"
    });
    let run_id = json!({ "type": "integer", "minimum": 1 });
    vec![
        ToolDef {
            name: "list_workflows",
            description: "List the GitHub Actions workflows of a repository.",
            method: Some(Method::GET),
            properties: target_properties(page_properties()),
            required: &[],
        },
        ToolDef {
            name: "get_workflow",
            description: "Get one workflow.",
            method: Some(Method::GET),
            properties: target_properties(json!({ "workflow_id": workflow.clone() })),
            required: &["workflow_id"],
        },
        ToolDef {
            name: "trigger_workflow",
            description: "Start a workflow that has a `workflow_dispatch` trigger.",
            method: Some(Method::POST),
            properties: target_properties(json!({
                "workflow_id": workflow.clone(),
                "ref": { "type": "string", "default": "main", "description": "Branch or tag to run on" },
                "inputs": {
                    "type": ["object", "string"],
                    "description": "Workflow inputs, as an object or a JSON string"
                }
            })),
            required: &["workflow_id"],
        },
        ToolDef {
            name: "list_workflow_runs",
            description: "List workflow runs, newest first.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({
                    "workflow_id": { "type": ["integer", "string"], "description": "Only runs of this workflow" },
                    "status": { "type": "string", "description": "queued, in_progress, completed, or a conclusion such as failure" }
                }),
                page_properties(),
            ])),
            required: &[],
        },
        ToolDef {
            name: "get_workflow_run",
            description: "Get one workflow run.",
            method: Some(Method::GET),
            properties: target_properties(json!({ "run_id": run_id.clone() })),
            required: &["run_id"],
        },
        ToolDef {
            name: "cancel_workflow_run",
            description: "Cancel a queued or running workflow run.",
            method: Some(Method::POST),
            properties: target_properties(json!({ "run_id": run_id.clone() })),
            required: &["run_id"],
        },
        ToolDef {
            name: "rerun_workflow",
            description: "Re-run a workflow run.",
            method: Some(Method::POST),
            properties: target_properties(json!({ "run_id": run_id.clone() })),
            required: &["run_id"],
        },
        ToolDef {
            name: "list_workflow_jobs",
            description: "List the jobs of a workflow run with their steps.",
            method: Some(Method::GET),
            properties: target_properties(properties([
                json!({ "run_id": run_id.clone() }),
                page_properties(),
            ])),
            required: &["run_id"],
        },
        ToolDef {
            name: "get_workflow_logs_url",
            description: "Download URL for the logs of a workflow run (requires the token to download).",
            method: None,
            properties: target_properties(json!({ "run_id": run_id })),
            required: &["run_id"],
        },
    ]
}

pub(super) async fn list_workflows(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let list = state
        .github
        .list_workflows(&t.owner, &t.repo, args.page()?)
        .await?;
    Ok(Value::Array(
        list.workflows
            .into_iter()
            .map(|w| {
                json!({
                    "id": w.id,
                    "name": w.name,
                    "path": w.path,
                    "state": w.state,
                    "html_url": w.html_url,
                })
            })
            .collect(),
    ))
}

pub(super) async fn get_workflow(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let w = state
        .github
        .get_workflow(&t.owner, &t.repo, &args.required_id("workflow_id")?)
        .await?;
    Ok(json!({
        "id": w.id,
        "name": w.name,
        "path": w.path,
        "state": w.state,
        "html_url": w.html_url,
        "created_at": w.created_at,
        "updated_at": w.updated_at,
    }))
}

pub(super) async fn trigger_workflow(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let workflow = args.required_id("workflow_id")?;
    let dispatch = WorkflowDispatch {
        git_ref: args.str_or("ref", "main")?.to_string(),
        inputs: args.json_object("inputs")?.unwrap_or_default(),
    };
    state
        .github
        .dispatch_workflow(&t.owner, &t.repo, &workflow, &dispatch)
        .await?;
    tracing::info!(repository = %t.full_name(), workflow, git_ref = %dispatch.git_ref, "workflow dispatched");
    Ok(json!({
        "status": "success",
        "message": format!("Workflow {workflow} triggered on {}", dispatch.git_ref),
    }))
}

pub(super) async fn list_workflow_runs(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let workflow = match args.opt_u64("workflow_id") {
        Ok(id) => id.map(|id| id.to_string()),
        Err(_) => args.non_empty_str("workflow_id")?.map(str::to_string),
    };
    let filter = RunFilter {
        workflow,
        status: args.non_empty_str("status")?.map(str::to_string),
        page: args.page()?,
    };
    let list = state
        .github
        .list_workflow_runs(&t.owner, &t.repo, &filter)
        .await?;
    Ok(Value::Array(
        list.workflow_runs
            .into_iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "name": r.name,
                    "status": r.status,
                    "conclusion": r.conclusion,
                    "event": r.event,
                    "head_branch": r.head_branch,
                    "head_sha": r.head_sha.as_deref().map(short_sha),
                    "run_attempt": r.run_attempt,
                    "html_url": r.html_url,
                    "created_at": r.created_at,
                })
            })
            .collect(),
    ))
}

pub(super) async fn get_workflow_run(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let r = state
        .github
        .get_workflow_run(&t.owner, &t.repo, args.required_u64("run_id")?)
        .await?;
    Ok(json!({
        "id": r.id,
        "name": r.name,
        "status": r.status,
        "conclusion": r.conclusion,
        "event": r.event,
        "head_branch": r.head_branch,
        "head_sha": r.head_sha,
        "run_number": r.run_number,
        "run_attempt": r.run_attempt,
        "html_url": r.html_url,
        "created_at": r.created_at,
        "updated_at": r.updated_at,
    }))
}

pub(super) async fn cancel_workflow_run(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let run_id = args.required_u64("run_id")?;
    state
        .github
        .cancel_workflow_run(&t.owner, &t.repo, run_id)
        .await?;
    Ok(json!({
        "status": "success",
        "message": format!("Workflow run {run_id} cancelled"),
    }))
}

pub(super) async fn rerun_workflow(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let run_id = args.required_u64("run_id")?;
    state.github.rerun_workflow(&t.owner, &t.repo, run_id).await?;
    Ok(json!({
        "status": "success",
        "message": format!("Workflow run {run_id} restarted"),
    }))
}

pub(super) async fn list_workflow_jobs(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let jobs = state
        .github
        .list_workflow_jobs(&t.owner, &t.repo, args.required_u64("run_id")?, args.page()?)
        .await?;
    Ok(Value::Array(
        jobs.into_iter()
            .map(|j| {
                let steps: Vec<Value> = j
                    .steps
                    .into_iter()
                    .map(|s| json!({ "name": s.name, "status": s.status, "conclusion": s.conclusion }))
                    .collect();
                json!({
                    "id": j.id,
                    "name": j.name,
                    "status": j.status,
                    "conclusion": j.conclusion,
                    "html_url": j.html_url,
                    "started_at": j.started_at,
                    "completed_at": j.completed_at,
                    "steps": steps,
                })
            })
            .collect(),
    ))
}

pub(super) fn get_workflow_logs_url(state: &AppState, args: &Args<'_>) -> ToolOutcome {
    let t = repo_target(state, args)?;
    let run_id = args.required_u64("run_id")?;
    Ok(json!({
        "run_id": run_id,
        "logs_url": state.github.workflow_logs_url(&t.owner, &t.repo, run_id)?,
        "note": "GitHub redirects this URL to a short-lived archive; send the token when downloading",
    }))
}
