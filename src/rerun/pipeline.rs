//! One invocation, end to end.
//!
//! ```text
//! parse commands -> eligibility -> gate -> fetch PR -> merged?
//!     -> list workflows -> select runs -> cancel / rerun
//! ```
//!
//! Every stage before "fetch PR" is local, so comment spam costs no API
//! calls. Each short-circuit is reported as a [`PipelineOutcome`] rather than
//! an error.

use crate::auth::{AuthorizationGate, GateCheck, GateDecision};
use crate::commands::parse_commands;
use crate::context::CommentContext;
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::GitHubApiError;

use super::eligibility::{Ineligibility, check_rerunable, is_merged};
use super::error::{PipelineError, perform};
use super::executor::{ExecutionPolicy, ExecutionSummary, execute_reruns};
use super::selection::select_runs;

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The comment contains no commands.
    NoCommands,
    Ineligible(Ineligibility),
    /// The gate denied the commenter; carries the failed checks.
    Unauthorized(Vec<GateCheck>),
    Merged,
    /// No targeted workflow has a run on the PR's head.
    NoMatchingRuns,
    Executed(ExecutionSummary),
}

/// The decision pipeline shared by the webhook server and the Action.
#[derive(Debug, Clone)]
pub struct RerunPipeline {
    gate: AuthorizationGate,
    self_workflow: Option<String>,
    policy: ExecutionPolicy,
}

impl RerunPipeline {
    pub fn new(
        gate: AuthorizationGate,
        self_workflow: Option<String>,
        policy: ExecutionPolicy,
    ) -> Self {
        RerunPipeline {
            gate,
            self_workflow,
            policy,
        }
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn self_workflow(&self) -> Option<&str> {
        self.self_workflow.as_deref()
    }

    pub async fn run<I>(
        &self,
        interpreter: &I,
        ctx: &CommentContext,
    ) -> Result<PipelineOutcome, PipelineError>
    where
        I: GitHubInterpreter<Error = GitHubApiError>,
    {
        let pr_number = ctx.issue.number;

        let commands = parse_commands(&ctx.body);
        if commands.is_empty() {
            tracing::debug!(repo = %ctx.repo, pr = %pr_number, "Comment has no commands");
            return Ok(PipelineOutcome::NoCommands);
        }

        if let Err(reason) = check_rerunable(&ctx.issue) {
            tracing::debug!(repo = %ctx.repo, pr = %pr_number, ?reason, "Issue is not rerunable");
            return Ok(PipelineOutcome::Ineligible(reason));
        }

        if let GateDecision::Denied { failed } = self.gate.evaluate(&ctx.author, &ctx.issue) {
            tracing::debug!(
                repo = %ctx.repo,
                pr = %pr_number,
                actor = %ctx.author.login,
                ?failed,
                "Commenter not authorized"
            );
            return Ok(PipelineOutcome::Unauthorized(failed));
        }

        let pr = match perform(interpreter, GitHubEffect::GetPr { pr: pr_number }).await? {
            GitHubResponse::Pr(pr) => pr,
            other => return Err(PipelineError::unexpected("get_pr", &other)),
        };
        if is_merged(&pr) {
            tracing::debug!(repo = %ctx.repo, pr = %pr_number, "PR already merged");
            return Ok(PipelineOutcome::Merged);
        }

        let workflows = match perform(interpreter, GitHubEffect::ListWorkflows).await? {
            GitHubResponse::Workflows(workflows) => workflows,
            other => return Err(PipelineError::unexpected("list_workflows", &other)),
        };

        let runs = select_runs(
            interpreter,
            &commands,
            &workflows,
            &pr,
            &ctx.issue.author_login,
            self.self_workflow(),
        )
        .await?;
        if runs.is_empty() {
            tracing::debug!(
                repo = %ctx.repo,
                pr = %pr_number,
                commands = ?commands,
                "No runs to rerun"
            );
            return Ok(PipelineOutcome::NoMatchingRuns);
        }

        let summary = execute_reruns(interpreter, &runs, self.policy).await;
        tracing::info!(
            repo = %ctx.repo,
            pr = %pr_number,
            actor = %ctx.author.login,
            attempted = summary.attempted(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "Processed rerun request"
        );
        Ok(PipelineOutcome::Executed(summary))
    }
}
