//! Cancelling and re-running the selected runs.
//!
//! Runs are processed one at a time, in selection order. A failure on one run
//! never stops the batch, and nothing is retried.

use serde::{Deserialize, Serialize};

use crate::effects::{GitHubEffect, GitHubInterpreter};
use crate::github::GitHubApiError;
use crate::types::{RunId, WorkflowId, WorkflowRun};

/// Knobs for the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPolicy {
    /// Re-run runs that already completed successfully. GitHub currently
    /// rejects reruns of successful runs, so this is off by default.
    #[serde(default)]
    pub rerun_successful_runs: bool,
}

/// What happened when cancelling a run ahead of its rerun.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The run had already completed.
    NotNeeded,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Completed successfully; left alone.
    SkippedSuccessful,
    Rerun { cancel: CancelOutcome },
    RerunFailed { cancel: CancelOutcome, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run: RunId,
    pub workflow: WorkflowId,
    pub outcome: RunOutcome,
}

/// Per-run results of one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub reports: Vec<RunReport>,
}

impl ExecutionSummary {
    /// Number of rerun requests issued.
    pub fn attempted(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| !matches!(r.outcome, RunOutcome::SkippedSuccessful))
            .count()
    }

    /// Number of rerun requests that failed.
    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, RunOutcome::RerunFailed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.reports.len() - self.attempted()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted() - self.failed()
    }
}

/// Cancels (when still running) and re-runs each run.
pub async fn execute_reruns<I>(
    interpreter: &I,
    runs: &[WorkflowRun],
    policy: ExecutionPolicy,
) -> ExecutionSummary
where
    I: GitHubInterpreter<Error = GitHubApiError>,
{
    let mut summary = ExecutionSummary::default();

    for run in runs {
        let outcome = execute_one(interpreter, run, policy).await;
        summary.reports.push(RunReport {
            run: run.id,
            workflow: run.workflow_id,
            outcome,
        });
    }

    summary
}

async fn execute_one<I>(interpreter: &I, run: &WorkflowRun, policy: ExecutionPolicy) -> RunOutcome
where
    I: GitHubInterpreter<Error = GitHubApiError>,
{
    if run.succeeded() && !policy.rerun_successful_runs {
        tracing::debug!(run_id = %run.id, "Run already succeeded; skipping");
        return RunOutcome::SkippedSuccessful;
    }

    let cancel = if run.status.is_completed() {
        CancelOutcome::NotNeeded
    } else {
        match interpreter
            .interpret(GitHubEffect::CancelRun { run: run.id })
            .await
        {
            Ok(_) => {
                tracing::debug!(run_id = %run.id, status = ?run.status, "Cancelled run");
                CancelOutcome::Cancelled
            }
            Err(e) => {
                // The run may have finished on its own in the meantime.
                tracing::debug!(run_id = %run.id, error = %e, "Cancel failed; re-running anyway");
                CancelOutcome::Failed(e.to_string())
            }
        }
    };

    match interpreter
        .interpret(GitHubEffect::RerunRun { run: run.id })
        .await
    {
        Ok(_) => {
            tracing::info!(run_id = %run.id, workflow_id = %run.workflow_id, "Requested rerun");
            RunOutcome::Rerun { cancel }
        }
        Err(e) => {
            tracing::error!(
                run_id = %run.id,
                workflow_id = %run.workflow_id,
                transient = e.is_transient(),
                error = %e,
                "Rerun failed"
            );
            RunOutcome::RerunFailed {
                cancel,
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        HEAD_SHA, PR_CREATED, RecordingInterpreter, completed_run, in_progress_run,
    };
    use crate::types::{RunConclusion, RunStatus};

    fn cancel(id: u64) -> GitHubEffect {
        GitHubEffect::CancelRun { run: RunId(id) }
    }

    fn rerun(id: u64) -> GitHubEffect {
        GitHubEffect::RerunRun { run: RunId(id) }
    }

    #[tokio::test]
    async fn in_progress_run_is_cancelled_then_rerun() {
        let interp = RecordingInterpreter::new();
        let runs = [in_progress_run(7, 1, HEAD_SHA, PR_CREATED)];

        let summary = execute_reruns(&interp, &runs, ExecutionPolicy::default()).await;

        assert_eq!(interp.effects(), vec![cancel(7), rerun(7)]);
        assert_eq!(
            summary.reports,
            vec![RunReport {
                run: RunId(7),
                workflow: WorkflowId(1),
                outcome: RunOutcome::Rerun {
                    cancel: CancelOutcome::Cancelled
                },
            }]
        );
        assert_eq!((summary.attempted(), summary.failed()), (1, 0));
    }

    #[tokio::test]
    async fn successful_runs_are_skipped_by_default() {
        let interp = RecordingInterpreter::new();
        let runs = [
            completed_run(1, 1, HEAD_SHA, PR_CREATED, RunConclusion::Success),
            completed_run(2, 2, HEAD_SHA, PR_CREATED, RunConclusion::Failure),
        ];

        let summary = execute_reruns(&interp, &runs, ExecutionPolicy::default()).await;

        assert_eq!(interp.effects(), vec![rerun(2)]);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.succeeded(), 1);
    }

    #[tokio::test]
    async fn policy_can_rerun_successful_runs() {
        let interp = RecordingInterpreter::new();
        let runs = [completed_run(1, 1, HEAD_SHA, PR_CREATED, RunConclusion::Success)];
        let policy = ExecutionPolicy {
            rerun_successful_runs: true,
        };

        execute_reruns(&interp, &runs, policy).await;

        assert_eq!(interp.effects(), vec![rerun(1)]);
    }

    #[tokio::test]
    async fn queued_and_unknown_statuses_are_cancelled() {
        let interp = RecordingInterpreter::new();
        let mut queued = in_progress_run(1, 1, HEAD_SHA, PR_CREATED);
        queued.status = RunStatus::Queued;
        let mut waiting = in_progress_run(2, 1, HEAD_SHA, PR_CREATED);
        waiting.status = RunStatus::Other("waiting".to_string());

        execute_reruns(&interp, &[queued, waiting], ExecutionPolicy::default()).await;

        assert_eq!(
            interp.effects(),
            vec![cancel(1), rerun(1), cancel(2), rerun(2)]
        );
    }

    #[tokio::test]
    async fn cancel_failure_still_reruns() {
        let interp = RecordingInterpreter::new().fail(cancel(7), 409);
        let runs = [in_progress_run(7, 1, HEAD_SHA, PR_CREATED)];

        let summary = execute_reruns(&interp, &runs, ExecutionPolicy::default()).await;

        assert_eq!(interp.effects(), vec![cancel(7), rerun(7)]);
        assert!(matches!(
            &summary.reports[0].outcome,
            RunOutcome::Rerun {
                cancel: CancelOutcome::Failed(_)
            }
        ));
        assert_eq!(summary.failed(), 0);
    }

    #[tokio::test]
    async fn rerun_failure_does_not_stop_the_batch() {
        let interp = RecordingInterpreter::new().fail(rerun(1), 403);
        let runs = [
            completed_run(1, 1, HEAD_SHA, PR_CREATED, RunConclusion::Failure),
            completed_run(2, 2, HEAD_SHA, PR_CREATED, RunConclusion::Cancelled),
        ];

        let summary = execute_reruns(&interp, &runs, ExecutionPolicy::default()).await;

        assert_eq!(interp.effects(), vec![rerun(1), rerun(2)]);
        assert_eq!(summary.attempted(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded(), 1);
    }

    #[tokio::test]
    async fn each_call_is_attempted_once() {
        let interp = RecordingInterpreter::new()
            .fail(cancel(1), 500)
            .fail(rerun(1), 503);
        let runs = [in_progress_run(1, 1, HEAD_SHA, PR_CREATED)];

        let summary = execute_reruns(&interp, &runs, ExecutionPolicy::default()).await;

        assert_eq!(interp.effects(), vec![cancel(1), rerun(1)]);
        assert_eq!(summary.failed(), 1);
    }
}
