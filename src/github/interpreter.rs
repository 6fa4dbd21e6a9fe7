//! GitHub effect interpreter using octocrab.
//!
//! Every effect maps to one REST call (workflow listing may page). Responses
//! are decoded into local `Raw*` structs that only name the fields we read, so
//! unrelated API changes don't break deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effects::{CommentData, GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{
    ActorIdentity, AuthorAssociation, CommentId, IssueState, PrNumber, PullRequestState,
    RunConclusion, RunId, RunStatus, Sha, Workflow, WorkflowId, WorkflowRun, WorkflowState,
};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// Page size for list endpoints (the API maximum).
const PER_PAGE: u8 = 100;

/// Safety limit on workflow list pagination.
const MAX_WORKFLOW_PAGES: u32 = 10;

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect).await
    }
}

/// Executes a single effect against the GitHub API. Never retries.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::GetComment { comment_id } => get_comment(client, comment_id).await,
        GitHubEffect::GetIssue { number } => get_issue(client, number).await,
        GitHubEffect::GetPr { pr } => get_pr(client, pr).await,
        GitHubEffect::ListWorkflows => list_workflows(client).await,
        GitHubEffect::ListWorkflowRuns {
            workflow,
            actor,
            event,
        } => list_workflow_runs(client, workflow, &actor, &event).await,
        GitHubEffect::CancelRun { run } => {
            post_run_action(client, run, "cancel").await?;
            Ok(GitHubResponse::Cancelled)
        }
        GitHubEffect::RerunRun { run } => {
            post_run_action(client, run, "rerun").await?;
            Ok(GitHubResponse::RerunRequested)
        }
    }
}

// ─── Raw API shapes ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: u64,
    body: Option<String>,
    user: RawUser,
    author_association: Option<String>,
    issue_url: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    labels: Vec<RawLabel>,
    user: RawUser,
    /// Present (with any value) only when the issue is a pull request.
    pull_request: Option<serde_json::Value>,
}

impl From<RawIssue> for IssueState {
    fn from(raw: RawIssue) -> Self {
        IssueState {
            number: PrNumber(raw.number),
            is_pull_request: raw.pull_request.is_some(),
            locked: raw.locked,
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            author_login: raw.user.login,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPull {
    number: u64,
    head: RawHead,
    created_at: DateTime<Utc>,
    #[serde(default)]
    merged: Option<bool>,
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    sha: String,
}

impl From<RawPull> for PullRequestState {
    fn from(raw: RawPull) -> Self {
        PullRequestState {
            number: PrNumber(raw.number),
            head_sha: Sha::new(raw.head.sha),
            created_at: raw.created_at,
            // `merged` is absent from some payload variants; merged_at is always there.
            merged: raw.merged.unwrap_or(raw.merged_at.is_some()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawWorkflowList {
    total_count: u64,
    workflows: Vec<RawWorkflow>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflow {
    id: u64,
    name: String,
    path: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct RawRunList {
    workflow_runs: Vec<RawRun>,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    id: u64,
    workflow_id: u64,
    head_sha: String,
    created_at: DateTime<Utc>,
    status: Option<String>,
    conclusion: Option<String>,
}

impl From<RawRun> for WorkflowRun {
    fn from(raw: RawRun) -> Self {
        WorkflowRun {
            id: RunId(raw.id),
            workflow_id: WorkflowId(raw.workflow_id),
            head_sha: Sha::new(raw.head_sha),
            created_at: raw.created_at,
            status: RunStatus::from_api_str(raw.status.as_deref().unwrap_or("")),
            conclusion: raw.conclusion.as_deref().map(RunConclusion::from_api_str),
        }
    }
}

// ─── Issues and comments ──────────────────────────────────────────────────────

/// Extracts the issue number from a comment's `issue_url`.
pub fn issue_number_from_url(issue_url: &str) -> Option<PrNumber> {
    issue_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse()
        .ok()
        .map(PrNumber)
}

async fn get_comment(
    client: &OctocrabClient,
    comment_id: CommentId,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("issues/comments/{}", comment_id.0));
    let raw: RawComment = client
        .inner()
        .get(&route, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let issue_number = issue_number_from_url(&raw.issue_url).ok_or_else(|| {
        GitHubApiError::permanent_without_source(format!(
            "comment {} has unparseable issue_url {:?}",
            comment_id, raw.issue_url
        ))
    })?;

    Ok(GitHubResponse::Comment(CommentData {
        id: CommentId(raw.id),
        body: raw.body.unwrap_or_default(),
        author: ActorIdentity::new(
            raw.user.login,
            raw.author_association
                .as_deref()
                .map(AuthorAssociation::from_api_str),
        ),
        issue_number,
    }))
}

async fn get_issue(
    client: &OctocrabClient,
    number: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("issues/{}", number.0));
    let raw: RawIssue = client
        .inner()
        .get(&route, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    Ok(GitHubResponse::Issue(raw.into()))
}

// ─── Pull requests ────────────────────────────────────────────────────────────

async fn get_pr(client: &OctocrabClient, pr: PrNumber) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("pulls/{}", pr.0));
    let raw: RawPull = client
        .inner()
        .get(&route, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::Pr(raw.into()))
}

// ─── Workflows ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

async fn list_workflows(client: &OctocrabClient) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route("actions/workflows");
    let mut page = 1u32;
    let mut all_workflows = Vec::new();

    loop {
        let result: RawWorkflowList = client
            .inner()
            .get(
                &route,
                Some(&PageParams {
                    per_page: PER_PAGE,
                    page,
                }),
            )
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let received = result.workflows.len();
        all_workflows.extend(result.workflows.into_iter().map(|w| Workflow {
            id: WorkflowId(w.id),
            name: w.name,
            path: w.path,
            state: WorkflowState::from_api_str(&w.state),
        }));

        let exhausted = received < usize::from(PER_PAGE)
            || all_workflows.len() as u64 >= result.total_count;
        if exhausted {
            break;
        }
        if page >= MAX_WORKFLOW_PAGES {
            tracing::warn!(
                pages = page,
                workflows = all_workflows.len(),
                total = result.total_count,
                "Hit pagination limit listing workflows; some workflows are ignored"
            );
            break;
        }
        page += 1;
    }

    Ok(GitHubResponse::Workflows(all_workflows))
}

#[derive(Serialize)]
struct RunFilter<'a> {
    actor: &'a str,
    event: &'a str,
    per_page: u8,
}

/// Lists the most recent page of runs for a workflow.
///
/// Only one page is fetched: the selector stops at the first run older than
/// the PR, and the newest 100 runs by the PR author cover any realistic PR.
async fn list_workflow_runs(
    client: &OctocrabClient,
    workflow: WorkflowId,
    actor: &str,
    event: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("actions/workflows/{}/runs", workflow.0));
    let result: RawRunList = client
        .inner()
        .get(
            &route,
            Some(&RunFilter {
                actor,
                event,
                per_page: PER_PAGE,
            }),
        )
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::WorkflowRuns(
        result.workflow_runs.into_iter().map(Into::into).collect(),
    ))
}

// ─── Run mutations ────────────────────────────────────────────────────────────

/// POSTs to `actions/runs/{id}/{action}`.
///
/// Both endpoints answer with an empty body, so the response is checked for
/// an error status and then dropped instead of being deserialized.
async fn post_run_action(
    client: &OctocrabClient,
    run: RunId,
    action: &str,
) -> Result<(), GitHubApiError> {
    let route = client.route(&format!("actions/runs/{}/{}", run.0, action));
    let response = client
        .inner()
        ._post(route.as_str(), None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    octocrab::map_github_error(response)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_number_from_api_url() {
        assert_eq!(
            issue_number_from_url("https://api.github.com/repos/octocat/hello-world/issues/1347"),
            Some(PrNumber(1347))
        );
        assert_eq!(
            issue_number_from_url("https://ghe.example.com/api/v3/repos/o/r/issues/7/"),
            Some(PrNumber(7))
        );
        assert_eq!(issue_number_from_url("https://api.github.com/repos/o/r/issues/"), None);
        assert_eq!(issue_number_from_url(""), None);
    }

    #[test]
    fn raw_issue_detects_pull_requests() {
        let raw: RawIssue = serde_json::from_value(serde_json::json!({
            "number": 12,
            "locked": false,
            "labels": [{"name": "ok-to-test"}, {"name": "bug"}],
            "user": {"login": "author"},
            "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/12"}
        }))
        .unwrap();
        let issue: IssueState = raw.into();
        assert!(issue.is_pull_request);
        assert!(issue.has_label("ok-to-test"));
        assert_eq!(issue.author_login, "author");

        let raw: RawIssue = serde_json::from_value(serde_json::json!({
            "number": 13,
            "user": {"login": "author"}
        }))
        .unwrap();
        let issue: IssueState = raw.into();
        assert!(!issue.is_pull_request);
        assert!(!issue.locked);
        assert!(issue.labels.is_empty());
    }

    #[test]
    fn raw_run_maps_status_and_conclusion() {
        let raw: RawRun = serde_json::from_value(serde_json::json!({
            "id": 30433642,
            "workflow_id": 159038,
            "head_sha": "acb5820ced9479c074f688cc328bf03f341a511d",
            "created_at": "2020-01-22T19:33:08Z",
            "status": "in_progress",
            "conclusion": null
        }))
        .unwrap();
        let run: WorkflowRun = raw.into();
        assert_eq!(run.id, RunId(30433642));
        assert_eq!(run.workflow_id, WorkflowId(159038));
        assert_eq!(run.status, RunStatus::InProgress);
        assert_eq!(run.conclusion, None);

        let raw: RawRun = serde_json::from_value(serde_json::json!({
            "id": 1,
            "workflow_id": 2,
            "head_sha": "abc",
            "created_at": "2020-01-22T19:33:08Z",
            "status": "completed",
            "conclusion": "success"
        }))
        .unwrap();
        assert!(WorkflowRun::from(raw).succeeded());
    }

    #[test]
    fn raw_pull_merged_falls_back_to_merged_at() {
        let raw: RawPull = serde_json::from_value(serde_json::json!({
            "number": 1,
            "head": {"sha": "abc"},
            "created_at": "2020-01-22T19:33:08Z",
            "merged_at": "2020-01-23T10:00:00Z"
        }))
        .unwrap();
        let pr: PullRequestState = raw.into();
        assert!(pr.merged);
        assert_eq!(pr.head_sha, Sha::new("abc"));

        let raw: RawPull = serde_json::from_value(serde_json::json!({
            "number": 2,
            "head": {"sha": "def"},
            "created_at": "2020-01-22T19:33:08Z",
            "merged": false,
            "merged_at": null
        }))
        .unwrap();
        assert!(!PullRequestState::from(raw).merged);
    }
}
