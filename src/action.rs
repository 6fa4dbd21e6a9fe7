//! GitHub Action entry point.
//!
//! The Action runs inside a workflow triggered by `issue_comment`. It either
//! fetches the comment named by the `comment_id` input, or falls back to the
//! event payload GitHub writes to `GITHUB_EVENT_PATH`. As with the webhook
//! server, only newly created comments are acted on.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ActionInputs, ConfigError};
use crate::context::CommentContext;
use crate::effects::GitHubInterpreter;
use crate::github::{GitHubApiError, OctocrabClient};
use crate::rerun::{PipelineError, PipelineOutcome};
use crate::webhooks::{CommentAction, GitHubEvent, IssueCommentEvent, ParseError, parse_webhook};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build GitHub client: {0}")]
    Client(#[source] octocrab::Error),

    #[error("no comment_id input and no GITHUB_EVENT_PATH to read the comment from")]
    MissingComment,

    #[error("failed reading event payload {path}: {source}")]
    ReadEvent {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing event payload: {0}")]
    ParseEvent(#[from] ParseError),

    #[error("triggering event is not an issue comment")]
    NotCommentEvent,

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// How an Action invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The event was an edited or deleted comment; nothing was run.
    Ignored(CommentAction),
    Finished(PipelineOutcome),
}

/// Runs the Action against the real API.
pub async fn run(inputs: &ActionInputs) -> Result<ActionOutcome, ActionError> {
    let client = OctocrabClient::from_token(
        inputs.repo_token.clone(),
        inputs.api_url.as_deref(),
        inputs.repository.clone(),
    )
    .map_err(ActionError::Client)?;
    run_with(inputs, &client).await
}

/// Runs the Action through any interpreter.
pub async fn run_with<I>(
    inputs: &ActionInputs,
    interpreter: &I,
) -> Result<ActionOutcome, ActionError>
where
    I: GitHubInterpreter<Error = GitHubApiError>,
{
    let pipeline = inputs.build_pipeline()?;

    let ctx = match (inputs.comment_id, &inputs.event_path) {
        (Some(comment_id), _) => {
            tracing::debug!(
                repo = %inputs.repository,
                comment = %comment_id,
                "Fetching comment by id"
            );
            CommentContext::fetch(interpreter, inputs.repository.clone(), comment_id).await?
        }
        (None, Some(path)) => {
            let event = comment_event_from_file(path).await?;
            if !event.triggers_rerun() {
                tracing::info!(
                    repo = %event.repo,
                    comment = %event.comment_id,
                    action = ?event.action,
                    "Ignoring comment that was not newly created"
                );
                return Ok(ActionOutcome::Ignored(event.action));
            }
            CommentContext::from_event(event)
        }
        (None, None) => return Err(ActionError::MissingComment),
    };

    let outcome = pipeline.run(interpreter, &ctx).await?;
    tracing::debug!(repo = %ctx.repo, pr = %ctx.issue.number, ?outcome, "Action finished");
    Ok(ActionOutcome::Finished(outcome))
}

async fn comment_event_from_file(path: &Path) -> Result<IssueCommentEvent, ActionError> {
    let payload = tokio::fs::read(path)
        .await
        .map_err(|source| ActionError::ReadEvent {
            path: path.to_path_buf(),
            source,
        })?;
    match parse_webhook("issue_comment", &payload)? {
        Some(GitHubEvent::IssueComment(event)) => Ok(event),
        _ => Err(ActionError::NotCommentEvent),
    }
}
