//! Typed webhook events.
//!
//! Only the deliveries the bot reacts to are modelled. Everything else is
//! acknowledged and dropped by the parser.

use serde::{Deserialize, Serialize};

use crate::types::{ActorIdentity, CommentId, IssueState, RepoId};

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    /// A comment on an issue or pull request conversation.
    ///
    /// Comments on a PR's conversation tab arrive as `issue_comment`, not as
    /// review comments.
    IssueComment(IssueCommentEvent),

    /// Sent once when the webhook is created.
    Ping { hook_id: Option<u64> },
}

impl GitHubEvent {
    /// Returns the repository the event belongs to, if it carries one.
    pub fn repo_id(&self) -> Option<&RepoId> {
        match self {
            GitHubEvent::IssueComment(e) => Some(&e.repo),
            GitHubEvent::Ping { .. } => None,
        }
    }
}

/// Action performed on an issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    Created,
    Edited,
    Deleted,
}

/// An `issue_comment` delivery.
///
/// Carries the issue snapshot embedded in the payload, so a webhook-driven
/// invocation doesn't need to fetch the comment or the issue again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    pub repo: RepoId,

    pub action: CommentAction,

    pub comment_id: CommentId,

    /// The comment body. Empty for `deleted` actions.
    pub body: String,

    pub author: ActorIdentity,

    pub issue: IssueState,
}

impl IssueCommentEvent {
    /// Only newly created comments are treated as commands.
    pub fn triggers_rerun(&self) -> bool {
        self.action == CommentAction::Created
    }
}
