//! Runs the rerun pipeline for accepted comment deliveries.
//!
//! The webhook handler only validates and enqueues; this loop receives the
//! jobs and spawns one task per delivery, each with its own repo-scoped
//! client. Deliveries never share state beyond the immutable pipeline.
//!
//! Spawned deliveries are tracked. On shutdown the dispatcher stops taking
//! new jobs but waits for every started delivery to finish, so a run that
//! was cancelled always gets its rerun request.

use std::sync::Arc;

use octocrab::Octocrab;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::context::CommentContext;
use crate::effects::GitHubInterpreter;
use crate::github::{GitHubApiError, OctocrabClient};
use crate::rerun::{PipelineOutcome, RerunPipeline};
use crate::types::{DeliveryId, RepoId};

/// An accepted `issue_comment` delivery waiting to be processed.
#[derive(Debug, Clone)]
pub struct CommentJob {
    pub delivery: DeliveryId,
    pub context: CommentContext,
}

pub type JobSender = mpsc::UnboundedSender<CommentJob>;
pub type JobReceiver = mpsc::UnboundedReceiver<CommentJob>;

pub fn job_channel() -> (JobSender, JobReceiver) {
    mpsc::unbounded_channel()
}

/// Receives jobs until shutdown or until every sender is dropped, then waits
/// for in-flight deliveries.
pub async fn run_dispatcher(
    rx: JobReceiver,
    pipeline: Arc<RerunPipeline>,
    octocrab: Octocrab,
    shutdown: CancellationToken,
) {
    dispatch_jobs(
        rx,
        pipeline,
        move |repo: &RepoId| OctocrabClient::new(octocrab.clone(), repo.clone()),
        shutdown,
    )
    .await;
}

/// Dispatcher loop over any interpreter factory.
pub async fn dispatch_jobs<F, I>(
    mut rx: JobReceiver,
    pipeline: Arc<RerunPipeline>,
    make_client: F,
    shutdown: CancellationToken,
) where
    F: Fn(&RepoId) -> I,
    I: GitHubInterpreter<Error = GitHubApiError> + Send + Sync + 'static,
{
    let tasks = TaskTracker::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown signal received, stopping dispatcher");
                break;
            }

            job = rx.recv() => {
                let Some(job) = job else {
                    info!("Job channel closed");
                    break;
                };
                let client = make_client(&job.context.repo);
                let pipeline = Arc::clone(&pipeline);
                tasks.spawn(async move {
                    process_comment(&pipeline, &client, job).await;
                });
            }
        }
    }

    tasks.close();
    if !tasks.is_empty() {
        info!(in_flight = tasks.len(), "Waiting for in-flight deliveries");
    }
    tasks.wait().await;
}

/// Runs one delivery through the pipeline and logs how it ended.
pub async fn process_comment<I>(
    pipeline: &RerunPipeline,
    interpreter: &I,
    job: CommentJob,
) -> Option<PipelineOutcome>
where
    I: GitHubInterpreter<Error = GitHubApiError>,
{
    let CommentJob { delivery, context } = job;
    match pipeline.run(interpreter, &context).await {
        Ok(PipelineOutcome::Executed(summary)) => {
            if summary.failed() > 0 {
                warn!(
                    delivery_id = %delivery,
                    repo = %context.repo,
                    pr = %context.issue.number,
                    failed = summary.failed(),
                    attempted = summary.attempted(),
                    "Some reruns failed"
                );
            }
            Some(PipelineOutcome::Executed(summary))
        }
        Ok(outcome) => {
            debug!(delivery_id = %delivery, repo = %context.repo, ?outcome, "Nothing to rerun");
            Some(outcome)
        }
        Err(e) => {
            error!(
                delivery_id = %delivery,
                repo = %context.repo,
                pr = %context.issue.number,
                transient = e.is_transient(),
                error = %e,
                "Rerun request failed"
            );
            None
        }
    }
}
