//! Choosing which workflow runs a comment refers to.
//!
//! For every targeted workflow, the selector picks at most one run: the
//! newest run on the PR's head commit that was created after the PR itself.

use crate::commands::CommandSet;
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, PULL_REQUEST_EVENT};
use crate::github::GitHubApiError;
use crate::types::{PullRequestState, Workflow, WorkflowRun};

use super::error::{PipelineError, perform};

/// True if `workflow` is the workflow this process is running as.
///
/// `GITHUB_WORKFLOW` holds the workflow's name, or its file path when the
/// workflow has no name, so both are compared.
pub fn is_self_workflow(workflow: &Workflow, self_workflow: Option<&str>) -> bool {
    self_workflow.is_some_and(|me| workflow.name == me || workflow.path == me)
}

/// Workflows the commands refer to, in listing order.
///
/// Inactive workflows and the running workflow itself are never targeted.
pub fn target_workflows<'a>(
    commands: &CommandSet,
    workflows: &'a [Workflow],
    self_workflow: Option<&str>,
) -> Vec<&'a Workflow> {
    let all = commands.reruns_all();
    workflows
        .iter()
        .filter(|w| all || commands.requests_workflow(&w.name))
        .filter(|w| {
            if !w.is_active() {
                tracing::debug!(workflow = %w.name, state = ?w.state, "Skipping inactive workflow");
                return false;
            }
            if is_self_workflow(w, self_workflow) {
                tracing::debug!(workflow = %w.name, "Skipping own workflow");
                return false;
            }
            true
        })
        .collect()
}

/// Picks the run of one workflow that belongs to the PR's current head.
///
/// Runs are sorted newest first (stable, so equal timestamps keep listing
/// order). The scan stops at the first run older than the PR and returns the
/// first run on the head SHA.
pub fn select_run_for_pr(mut runs: Vec<WorkflowRun>, pr: &PullRequestState) -> Option<WorkflowRun> {
    runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    runs.into_iter()
        .take_while(|run| run.created_at >= pr.created_at)
        .find(|run| run.head_sha == pr.head_sha)
}

/// Lists runs for each targeted workflow and selects at most one per workflow.
///
/// Workflows are queried one at a time. Any listing failure aborts the whole
/// selection.
pub async fn select_runs<I>(
    interpreter: &I,
    commands: &CommandSet,
    workflows: &[Workflow],
    pr: &PullRequestState,
    pr_author: &str,
    self_workflow: Option<&str>,
) -> Result<Vec<WorkflowRun>, PipelineError>
where
    I: GitHubInterpreter<Error = GitHubApiError>,
{
    let mut selected = Vec::new();

    for workflow in target_workflows(commands, workflows, self_workflow) {
        let effect = GitHubEffect::ListWorkflowRuns {
            workflow: workflow.id,
            actor: pr_author.to_string(),
            event: PULL_REQUEST_EVENT.to_string(),
        };
        let runs = match perform(interpreter, effect).await? {
            GitHubResponse::WorkflowRuns(runs) => runs,
            other => return Err(PipelineError::unexpected("list_workflow_runs", &other)),
        };

        let listed = runs.len();
        match select_run_for_pr(runs, pr) {
            Some(run) => {
                tracing::debug!(
                    workflow = %workflow.name,
                    run_id = %run.id,
                    status = ?run.status,
                    "Selected run"
                );
                selected.push(run);
            }
            None => {
                tracing::debug!(
                    workflow = %workflow.name,
                    listed,
                    head_sha = %pr.head_sha.short(),
                    "No run matches the PR head"
                );
            }
        }
    }

    Ok(selected)
}
