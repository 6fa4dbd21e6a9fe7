//! Per-invocation errors.

use thiserror::Error;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::GitHubApiError;

/// A failure that ends one invocation before any run is touched.
///
/// Per-run cancel/rerun failures are not errors at this level; they are
/// recorded in the execution summary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{operation} failed: {source}")]
    GitHub {
        operation: &'static str,
        #[source]
        source: GitHubApiError,
    },

    #[error("{operation} returned an unexpected {got} response")]
    UnexpectedResponse {
        operation: &'static str,
        got: &'static str,
    },
}

impl PipelineError {
    /// Whether a later invocation might succeed (rate limit, 5xx, network).
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::GitHub { source, .. } => source.is_transient(),
            PipelineError::UnexpectedResponse { .. } => false,
        }
    }

    pub(crate) fn unexpected(operation: &'static str, response: &GitHubResponse) -> Self {
        PipelineError::UnexpectedResponse {
            operation,
            got: response.kind(),
        }
    }
}

/// Interprets one effect, tagging failures with the operation name.
pub(crate) async fn perform<I>(
    interpreter: &I,
    effect: GitHubEffect,
) -> Result<GitHubResponse, PipelineError>
where
    I: GitHubInterpreter<Error = GitHubApiError>,
{
    let operation = effect.name();
    interpreter
        .interpret(effect)
        .await
        .map_err(|source| PipelineError::GitHub { operation, source })
}
