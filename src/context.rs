//! The comment an invocation reacts to, however it was delivered.
//!
//! Webhook deliveries embed the comment and its issue; the Action only knows
//! a comment id and has to fetch both. Either way the pipeline sees one
//! [`CommentContext`].

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::GitHubApiError;
use crate::rerun::PipelineError;
use crate::rerun::error::perform;
use crate::types::{ActorIdentity, CommentId, IssueState, RepoId};
use crate::webhooks::IssueCommentEvent;

/// Snapshot of a comment and the issue it was posted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContext {
    pub repo: RepoId,
    pub comment_id: CommentId,
    pub body: String,
    pub author: ActorIdentity,
    pub issue: IssueState,
}

impl CommentContext {
    pub fn from_event(event: IssueCommentEvent) -> Self {
        CommentContext {
            repo: event.repo,
            comment_id: event.comment_id,
            body: event.body,
            author: event.author,
            issue: event.issue,
        }
    }

    /// Fetches the comment, then the issue it belongs to.
    pub async fn fetch<I>(
        interpreter: &I,
        repo: RepoId,
        comment_id: CommentId,
    ) -> Result<Self, PipelineError>
    where
        I: GitHubInterpreter<Error = GitHubApiError>,
    {
        let comment = match perform(interpreter, GitHubEffect::GetComment { comment_id }).await? {
            GitHubResponse::Comment(comment) => comment,
            other => return Err(PipelineError::unexpected("get_comment", &other)),
        };

        let effect = GitHubEffect::GetIssue {
            number: comment.issue_number,
        };
        let issue = match perform(interpreter, effect).await? {
            GitHubResponse::Issue(issue) => issue,
            other => return Err(PipelineError::unexpected("get_issue", &other)),
        };

        tracing::debug!(
            repo = %repo,
            comment = %comment_id,
            issue = %issue.number,
            author = %comment.author.login,
            "Fetched comment context"
        );

        Ok(CommentContext {
            repo,
            comment_id: comment.id,
            body: comment.body,
            author: comment.author,
            issue,
        })
    }
}
