//! Webhook payload parser.
//!
//! Turns a raw delivery body into a typed [`GitHubEvent`].
//!
//! 1. The event type comes from the `X-GitHub-Event` header.
//! 2. Known event types are deserialized into local raw structs, then
//!    validated into domain types.
//! 3. Unknown event types return `Ok(None)` (ignored, not an error).
//! 4. Malformed payloads return `Err`.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{ActorIdentity, AuthorAssociation, CommentId, IssueState, PrNumber, RepoId};

use super::events::{CommentAction, GitHubEvent, IssueCommentEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A field has a value we can't interpret.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// ```
/// use rerun_bot::webhooks::{parse_webhook, GitHubEvent};
///
/// let payload = br#"{
///     "action": "created",
///     "comment": {
///         "id": 123,
///         "body": "/retest",
///         "user": { "login": "octocat" },
///         "author_association": "MEMBER"
///     },
///     "issue": {
///         "number": 42,
///         "locked": false,
///         "labels": [{ "name": "ok-to-test" }],
///         "user": { "login": "contributor" },
///         "pull_request": { "url": "..." }
///     },
///     "repository": { "owner": { "login": "owner" }, "name": "repo" }
/// }"#;
///
/// let event = parse_webhook("issue_comment", payload).unwrap();
/// assert!(matches!(event, Some(GitHubEvent::IssueComment(_))));
/// assert!(parse_webhook("push", b"{}").unwrap().is_none());
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "issue_comment" => parse_issue_comment(payload).map(|e| Some(GitHubEvent::IssueComment(e))),
        "ping" => parse_ping(payload).map(Some),
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawUser,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

// ============================================================================
// issue_comment
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: u64,
    body: Option<String>,
    user: RawUser,
    author_association: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    labels: Vec<RawLabel>,
    user: RawUser,
    // Present only when the issue is a PR.
    pull_request: Option<serde_json::Value>,
}

fn parse_comment_action(action: &str) -> Result<CommentAction, ParseError> {
    match action {
        "created" => Ok(CommentAction::Created),
        "edited" => Ok(CommentAction::Edited),
        "deleted" => Ok(CommentAction::Deleted),
        other => Err(ParseError::InvalidField {
            field: "action",
            value: other.to_string(),
        }),
    }
}

fn parse_issue_comment(payload: &[u8]) -> Result<IssueCommentEvent, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;
    let action = parse_comment_action(&raw.action)?;

    let issue = IssueState {
        number: PrNumber(raw.issue.number),
        is_pull_request: raw.issue.pull_request.is_some(),
        locked: raw.issue.locked,
        labels: raw.issue.labels.into_iter().map(|l| l.name).collect(),
        author_login: raw.issue.user.login,
    };

    let author = ActorIdentity::new(
        raw.comment.user.login,
        raw.comment
            .author_association
            .as_deref()
            .map(AuthorAssociation::from_api_str),
    );

    Ok(IssueCommentEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        action,
        comment_id: CommentId(raw.comment.id),
        body: raw.comment.body.unwrap_or_default(),
        author,
        issue,
    })
}

// ============================================================================
// ping
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPingPayload {
    hook_id: Option<u64>,
}

fn parse_ping(payload: &[u8]) -> Result<GitHubEvent, ParseError> {
    let raw: RawPingPayload = serde_json::from_slice(payload)?;
    Ok(GitHubEvent::Ping {
        hook_id: raw.hook_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn comment_payload(action: &str, pull_request: bool) -> Vec<u8> {
        let mut issue = json!({
            "number": 7,
            "locked": true,
            "labels": [{"name": "ok-to-test"}, {"name": "area/ci"}],
            "user": {"login": "pr-author"}
        });
        if pull_request {
            issue["pull_request"] = json!({"url": "https://api.github.com/repos/o/r/pulls/7"});
        }
        serde_json::to_vec(&json!({
            "action": action,
            "comment": {
                "id": 99,
                "body": "/retest\r\n",
                "user": {"login": "reviewer"},
                "author_association": "COLLABORATOR"
            },
            "issue": issue,
            "repository": {
                "owner": {"login": "acme"},
                "name": "widgets",
                "full_name": "acme/widgets"
            },
            "sender": {"login": "reviewer"}
        }))
        .unwrap()
    }

    #[test]
    fn parses_created_comment_on_pr() {
        let event = parse_webhook("issue_comment", &comment_payload("created", true))
            .unwrap()
            .unwrap();
        let GitHubEvent::IssueComment(e) = event else {
            panic!("expected IssueComment, got {event:?}");
        };

        assert_eq!(e.repo, RepoId::new("acme", "widgets"));
        assert_eq!(e.action, CommentAction::Created);
        assert!(e.triggers_rerun());
        assert_eq!(e.comment_id, CommentId(99));
        assert_eq!(e.body, "/retest\r\n");
        assert_eq!(e.author.login, "reviewer");
        assert_eq!(e.author.association, Some(AuthorAssociation::Collaborator));
        assert_eq!(e.issue.number, PrNumber(7));
        assert!(e.issue.is_pull_request);
        assert!(e.issue.locked);
        assert!(e.issue.has_label("ok-to-test"));
        assert_eq!(e.issue.author_login, "pr-author");
    }

    #[test]
    fn plain_issue_is_not_a_pull_request() {
        let Some(GitHubEvent::IssueComment(e)) =
            parse_webhook("issue_comment", &comment_payload("created", false)).unwrap()
        else {
            panic!("expected IssueComment");
        };
        assert!(!e.issue.is_pull_request);
    }

    #[test]
    fn edits_and_deletes_parse_but_do_not_trigger() {
        for action in ["edited", "deleted"] {
            let Some(GitHubEvent::IssueComment(e)) =
                parse_webhook("issue_comment", &comment_payload(action, true)).unwrap()
            else {
                panic!("expected IssueComment");
            };
            assert!(!e.triggers_rerun(), "{action} should not trigger");
        }
    }

    #[test]
    fn unknown_action_is_invalid() {
        let err = parse_webhook("issue_comment", &comment_payload("pinned", true)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidField { field: "action", .. }
        ));
    }

    #[test]
    fn missing_fields_are_json_errors() {
        let err = parse_webhook("issue_comment", br#"{"action": "created"}"#).unwrap_err();
        assert!(matches!(err, ParseError::JsonError(_)));
    }

    #[test]
    fn ping_and_unknown_events() {
        let ping = br#"{"zen": "Keep it logically awesome.", "hook_id": 5}"#;
        assert_eq!(
            parse_webhook("ping", ping).unwrap(),
            Some(GitHubEvent::Ping { hook_id: Some(5) })
        );
        assert_eq!(parse_webhook("pull_request", b"not json").unwrap(), None);
        assert_eq!(parse_webhook("workflow_run", b"{}").unwrap(), None);
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(
            event in "issue_comment|ping|push",
            payload in proptest::collection::vec(any::<u8>(), 0..512)
        ) {
            let _ = parse_webhook(&event, &payload);
        }
    }
}
