use super::{Page, body, push_opt};
use crate::client::{GitHubClient, Query};
use crate::error::Result;
use crate::models::{Job, JobList, Workflow, WorkflowList, WorkflowRun, WorkflowRunList, decode};
use crate::path::ApiPath;
use serde::Serialize;
use serde_json::{Map, Value};

/// Body of `POST .../actions/workflows/{id}/dispatches`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDispatch {
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub inputs: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    /// Workflow id or file name. `None` lists runs of every workflow.
    pub workflow: Option<String>,
    /// `queued`, `in_progress`, `completed`, or a conclusion such as `failure`.
    pub status: Option<String>,
    pub page: Page,
}

fn actions(owner: &str, repo: &str) -> Result<ApiPath> {
    Ok(ApiPath::repo(owner, repo)?.seg("actions"))
}

fn run(owner: &str, repo: &str, run_id: u64) -> Result<ApiPath> {
    Ok(actions(owner, repo)?.seg("runs").seg(run_id))
}

impl GitHubClient {
    pub async fn list_workflows(&self, owner: &str, repo: &str, page: Page) -> Result<WorkflowList> {
        let mut q = Query::new();
        page.push(&mut q);
        decode(self.get(actions(owner, repo)?.seg("workflows"), &q).await?)
    }

    /// `workflow` is a numeric id or a file name such as `ci.yml`.
    pub async fn get_workflow(&self, owner: &str, repo: &str, workflow: &str) -> Result<Workflow> {
        decode(
            self.get(actions(owner, repo)?.seg("workflows").name(workflow)?, &[])
                .await?,
        )
    }

    /// Fire a `workflow_dispatch` event. GitHub answers 204.
    pub async fn dispatch_workflow(
        &self,
        owner: &str,
        repo: &str,
        workflow: &str,
        dispatch: &WorkflowDispatch,
    ) -> Result<Value> {
        let endpoint = actions(owner, repo)?
            .seg("workflows")
            .name(workflow)?
            .seg("dispatches");
        self.post(endpoint, Some(&body(dispatch)?)).await
    }

    pub async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        filter: &RunFilter,
    ) -> Result<WorkflowRunList> {
        let endpoint = match filter.workflow.as_deref() {
            Some(w) => actions(owner, repo)?.seg("workflows").name(w)?.seg("runs"),
            None => actions(owner, repo)?.seg("runs"),
        };
        let mut q = Query::new();
        filter.page.push(&mut q);
        push_opt(&mut q, "status", filter.status.as_deref());
        decode(self.get(endpoint, &q).await?)
    }

    pub async fn get_workflow_run(&self, owner: &str, repo: &str, run_id: u64) -> Result<WorkflowRun> {
        decode(self.get(run(owner, repo, run_id)?, &[]).await?)
    }

    pub async fn cancel_workflow_run(&self, owner: &str, repo: &str, run_id: u64) -> Result<Value> {
        self.post(run(owner, repo, run_id)?.seg("cancel"), None).await
    }

    pub async fn rerun_workflow(&self, owner: &str, repo: &str, run_id: u64) -> Result<Value> {
        self.post(run(owner, repo, run_id)?.seg("rerun"), None).await
    }

    pub async fn list_workflow_jobs(
        &self,
        owner: &str,
        repo: &str,
        run_id: u64,
        page: Page,
    ) -> Result<Vec<Job>> {
        let mut q = Query::new();
        page.push(&mut q);
        let list: JobList = decode(self.get(run(owner, repo, run_id)?.seg("jobs"), &q).await?)?;
        Ok(list.jobs)
    }

    /// Download URL for a workflow run's logs.
    ///
    /// GitHub answers this endpoint with a short-lived redirect, so the URL is handed to the
    /// caller instead of being fetched.
    pub fn workflow_logs_url(&self, owner: &str, repo: &str, run_id: u64) -> Result<String> {
        let path = run(owner, repo, run_id)?.seg("logs");
        Ok(self.url_for(&path, &[])?.to_string())
    }
}
