//! Shared test fixtures, a recording interpreter, and proptest strategies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::{GitHubApiError, GitHubErrorKind};
use crate::types::{
    ActorIdentity, AuthorAssociation, IssueState, PrNumber, PullRequestState, RunConclusion,
    RunId, RunStatus, Sha, Workflow, WorkflowId, WorkflowRun, WorkflowState,
};

// ─── Fixtures ─────────────────────────────────────────────────────────────────

/// Login of the PR author in fixtures.
pub const PR_AUTHOR: &str = "pr-author";

/// Head SHA of the PR in fixtures.
pub const HEAD_SHA: &str = "1111111111111111111111111111111111111111";

/// Creation time of the PR in fixtures (seconds since epoch).
pub const PR_CREATED: i64 = 1_700_000_000;

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

pub fn actor(login: &str, association: Option<AuthorAssociation>) -> ActorIdentity {
    ActorIdentity::new(login, association)
}

/// An open, unlocked PR (as an issue) authored by [`PR_AUTHOR`].
pub fn issue_with_labels(labels: &[&str]) -> IssueState {
    IssueState {
        number: PrNumber(1),
        is_pull_request: true,
        locked: false,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        author_login: PR_AUTHOR.to_string(),
    }
}

/// An unmerged PR at [`HEAD_SHA`], created at [`PR_CREATED`].
pub fn pull_request() -> PullRequestState {
    PullRequestState {
        number: PrNumber(1),
        head_sha: Sha::new(HEAD_SHA),
        created_at: at(PR_CREATED),
        merged: false,
    }
}

pub fn workflow(id: u64, name: &str) -> Workflow {
    Workflow {
        id: WorkflowId(id),
        name: name.to_string(),
        path: format!(".github/workflows/{name}.yml"),
        state: WorkflowState::Active,
    }
}

pub fn completed_run(
    id: u64,
    workflow: u64,
    sha: &str,
    created: i64,
    conclusion: RunConclusion,
) -> WorkflowRun {
    WorkflowRun {
        id: RunId(id),
        workflow_id: WorkflowId(workflow),
        head_sha: Sha::new(sha),
        created_at: at(created),
        status: RunStatus::Completed,
        conclusion: Some(conclusion),
    }
}

pub fn in_progress_run(id: u64, workflow: u64, sha: &str, created: i64) -> WorkflowRun {
    WorkflowRun {
        id: RunId(id),
        workflow_id: WorkflowId(workflow),
        head_sha: Sha::new(sha),
        created_at: at(created),
        status: RunStatus::InProgress,
        conclusion: None,
    }
}

/// The `ListWorkflowRuns` effect the selector issues for a fixture PR.
pub fn list_runs_effect(workflow: u64) -> GitHubEffect {
    GitHubEffect::ListWorkflowRuns {
        workflow: WorkflowId(workflow),
        actor: PR_AUTHOR.to_string(),
        event: crate::effects::PULL_REQUEST_EVENT.to_string(),
    }
}

pub fn api_error(status: u16, message: &str) -> GitHubApiError {
    GitHubApiError {
        kind: if status >= 500 {
            GitHubErrorKind::Transient
        } else {
            GitHubErrorKind::Permanent
        },
        status_code: Some(status),
        message: message.to_string(),
        source: None,
    }
}

// ─── Recording interpreter ────────────────────────────────────────────────────

/// Interpreter with canned responses that records every effect it receives.
///
/// Queries without a canned response fail with a 404. Mutations without one
/// succeed.
#[derive(Default)]
pub struct RecordingInterpreter {
    responses: HashMap<GitHubEffect, Result<GitHubResponse, u16>>,
    effects: Mutex<Vec<GitHubEffect>>,
}

impl RecordingInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, effect: GitHubEffect, response: GitHubResponse) -> Self {
        self.responses.insert(effect, Ok(response));
        self
    }

    pub fn fail(mut self, effect: GitHubEffect, status: u16) -> Self {
        self.responses.insert(effect, Err(status));
        self
    }

    /// Every effect received so far, in order.
    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.effects.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<GitHubEffect> {
        self.effects()
            .into_iter()
            .filter(GitHubEffect::is_mutation)
            .collect()
    }
}

impl GitHubInterpreter for RecordingInterpreter {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        self.effects.lock().unwrap().push(effect.clone());
        match self.responses.get(&effect) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(status)) => Err(api_error(*status, "canned failure")),
            None => match effect {
                GitHubEffect::CancelRun { .. } => Ok(GitHubResponse::Cancelled),
                GitHubEffect::RerunRun { .. } => Ok(GitHubResponse::RerunRequested),
                other => Err(api_error(404, &format!("no canned response for {other:?}"))),
            },
        }
    }
}

/// Lets one recorder be shared by tasks that each need an owned interpreter.
impl GitHubInterpreter for Arc<RecordingInterpreter> {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        self.as_ref().interpret(effect).await
    }
}

// ─── Strategies ───────────────────────────────────────────────────────────────

pub fn arb_login() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9-]{0,20}"
}

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    // A small alphabet makes head SHA collisions likely.
    prop_oneof![Just(HEAD_SHA.to_string()), "[0-9a-f]{40}"].prop_map(Sha::new)
}

pub fn arb_run_status() -> impl Strategy<Value = (RunStatus, Option<RunConclusion>)> {
    prop_oneof![
        Just((RunStatus::Queued, None)),
        Just((RunStatus::InProgress, None)),
        Just((RunStatus::Completed, Some(RunConclusion::Success))),
        Just((RunStatus::Completed, Some(RunConclusion::Failure))),
        Just((RunStatus::Completed, Some(RunConclusion::Cancelled))),
    ]
}

/// Runs of one workflow, created within a day either side of [`PR_CREATED`],
/// in arbitrary order.
pub fn arb_runs(workflow: u64) -> impl Strategy<Value = Vec<WorkflowRun>> {
    prop::collection::vec(
        (
            1u64..10_000,
            arb_sha(),
            (PR_CREATED - 86_400)..(PR_CREATED + 86_400),
            arb_run_status(),
        ),
        0..12,
    )
    .prop_map(move |runs| {
        runs.into_iter()
            .map(|(id, sha, created, (status, conclusion))| WorkflowRun {
                id: RunId(id),
                workflow_id: WorkflowId(workflow),
                head_sha: sha,
                created_at: at(created),
                status,
                conclusion,
            })
            .collect()
    })
}

pub fn arb_workflows() -> impl Strategy<Value = Vec<Workflow>> {
    prop::collection::vec(("[a-z]{1,6}", any::<bool>()), 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (name, active))| Workflow {
                id: WorkflowId(i as u64 + 1),
                path: format!(".github/workflows/{name}.yml"),
                name,
                state: if active {
                    WorkflowState::Active
                } else {
                    WorkflowState::Inactive("disabled_manually".to_string())
                },
            })
            .collect()
    })
}
