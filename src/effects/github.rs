//! GitHub API effect types.
//!
//! These types describe GitHub API operations as data, without executing them.
//! [`crate::github`] interprets them against the REST API; tests interpret
//! them against canned responses.

use serde::{Deserialize, Serialize};

use crate::types::{
    ActorIdentity, CommentId, IssueState, PrNumber, PullRequestState, RunId, Workflow,
    WorkflowId, WorkflowRun,
};

/// Event filter value for runs triggered by pull requests.
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// A GitHub API effect.
///
/// Effects are repo-scoped: the interpreter is constructed with a `RepoId`,
/// so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Queries ──────────────────────────────────────────────────────────────
    /// Fetch a single issue comment.
    GetComment { comment_id: CommentId },

    /// Fetch the issue (or PR-as-issue) a comment belongs to.
    GetIssue { number: PrNumber },

    /// Fetch a pull request.
    GetPr { pr: PrNumber },

    /// List every workflow in the repository.
    ListWorkflows,

    /// List runs of one workflow, filtered server-side.
    ///
    /// Responses are expected newest first, but callers must not rely on it.
    ListWorkflowRuns {
        workflow: WorkflowId,
        /// Only runs triggered by this login.
        actor: String,
        /// Only runs triggered by this event, normally `pull_request`.
        event: String,
    },

    // ─── Mutations ────────────────────────────────────────────────────────────
    /// Cancel a queued or in-progress run.
    CancelRun { run: RunId },

    /// Re-run a workflow run.
    RerunRun { run: RunId },
}

impl GitHubEffect {
    /// Short name of the operation, for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::GetComment { .. } => "get_comment",
            GitHubEffect::GetIssue { .. } => "get_issue",
            GitHubEffect::GetPr { .. } => "get_pr",
            GitHubEffect::ListWorkflows => "list_workflows",
            GitHubEffect::ListWorkflowRuns { .. } => "list_workflow_runs",
            GitHubEffect::CancelRun { .. } => "cancel_run",
            GitHubEffect::RerunRun { .. } => "rerun_run",
        }
    }

    /// True for effects that change state on GitHub.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            GitHubEffect::CancelRun { .. } | GitHubEffect::RerunRun { .. }
        )
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// An issue comment as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentData {
    pub id: CommentId,
    pub body: String,
    pub author: ActorIdentity,
    /// Number of the issue the comment was posted on.
    pub issue_number: PrNumber,
}

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetComment`.
    Comment(CommentData),

    /// Response to `GetIssue`.
    Issue(IssueState),

    /// Response to `GetPr`.
    Pr(PullRequestState),

    /// Response to `ListWorkflows`.
    Workflows(Vec<Workflow>),

    /// Response to `ListWorkflowRuns`.
    WorkflowRuns(Vec<WorkflowRun>),

    /// Response to `CancelRun`.
    Cancelled,

    /// Response to `RerunRun`.
    RerunRequested,
}

impl GitHubResponse {
    /// Name of the variant, for error messages about unexpected responses.
    pub fn kind(&self) -> &'static str {
        match self {
            GitHubResponse::Comment(_) => "comment",
            GitHubResponse::Issue(_) => "issue",
            GitHubResponse::Pr(_) => "pr",
            GitHubResponse::Workflows(_) => "workflows",
            GitHubResponse::WorkflowRuns(_) => "workflow_runs",
            GitHubResponse::Cancelled => "cancelled",
            GitHubResponse::RerunRequested => "rerun_requested",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cancel_and_rerun_mutate() {
        assert!(GitHubEffect::CancelRun { run: RunId(1) }.is_mutation());
        assert!(GitHubEffect::RerunRun { run: RunId(1) }.is_mutation());
        assert!(!GitHubEffect::ListWorkflows.is_mutation());
        assert!(!GitHubEffect::GetPr { pr: PrNumber(1) }.is_mutation());
        assert!(
            !GitHubEffect::ListWorkflowRuns {
                workflow: WorkflowId(1),
                actor: "octocat".to_string(),
                event: PULL_REQUEST_EVENT.to_string(),
            }
            .is_mutation()
        );
    }

    #[test]
    fn effects_serialize_tagged() {
        let json = serde_json::to_value(GitHubEffect::RerunRun { run: RunId(42) }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "rerun_run", "run": 42}));
    }

    #[test]
    fn name_matches_serde_tag() {
        let effects = [
            GitHubEffect::GetComment { comment_id: CommentId(1) },
            GitHubEffect::GetIssue { number: PrNumber(1) },
            GitHubEffect::ListWorkflows,
            GitHubEffect::CancelRun { run: RunId(3) },
        ];
        for effect in effects {
            let json = serde_json::to_value(&effect).unwrap();
            assert_eq!(json["type"], effect.name());
        }
    }
}
