//! GitHub Actions workflows and workflow runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{RunId, Sha, WorkflowId};

/// Whether a workflow can currently be run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Active,
    /// Any non-active state (`disabled_manually`, `disabled_inactivity`, ...).
    Inactive(String),
}

impl WorkflowState {
    pub fn from_api_str(s: &str) -> Self {
        if s == "active" {
            WorkflowState::Active
        } else {
            WorkflowState::Inactive(s.to_string())
        }
    }
}

/// A repository workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    /// Path of the workflow file, e.g. `.github/workflows/ci.yml`.
    pub path: String,
    pub state: WorkflowState,
}

impl Workflow {
    pub fn is_active(&self) -> bool {
        self.state == WorkflowState::Active
    }
}

/// Lifecycle status of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    /// `waiting`, `requested`, `pending` and anything else not yet completed.
    Other(String),
}

impl RunStatus {
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            other => RunStatus::Other(other.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        *self == RunStatus::Completed
    }
}

/// Final result of a completed workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    TimedOut,
    ActionRequired,
    Neutral,
    Skipped,
    Stale,
    Other(String),
}

impl RunConclusion {
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "success" => RunConclusion::Success,
            "failure" => RunConclusion::Failure,
            "cancelled" => RunConclusion::Cancelled,
            "timed_out" => RunConclusion::TimedOut,
            "action_required" => RunConclusion::ActionRequired,
            "neutral" => RunConclusion::Neutral,
            "skipped" => RunConclusion::Skipped,
            "stale" => RunConclusion::Stale,
            other => RunConclusion::Other(other.to_string()),
        }
    }
}

/// One execution of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: RunId,
    pub workflow_id: WorkflowId,
    pub head_sha: Sha,
    pub created_at: DateTime<Utc>,
    pub status: RunStatus,
    /// `None` until the run completes.
    pub conclusion: Option<RunConclusion>,
}

impl WorkflowRun {
    /// Completed with a `success` conclusion.
    pub fn succeeded(&self) -> bool {
        self.status.is_completed() && self.conclusion == Some(RunConclusion::Success)
    }
}
