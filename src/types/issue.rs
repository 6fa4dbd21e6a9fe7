//! Snapshots of the issue, pull request and commenting actor.
//!
//! All of these are fetched (or parsed from a webhook payload) once per
//! invocation and never mutated afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, Sha};

/// GitHub's classification of a commenter's relationship to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorAssociation {
    Owner,
    Member,
    Collaborator,
    Contributor,
    FirstTimer,
    FirstTimeContributor,
    Mannequin,
    None,
    /// A value this crate does not know about, kept verbatim.
    Other(String),
}

impl AuthorAssociation {
    /// Parses the API representation (`"OWNER"`, `"FIRST_TIME_CONTRIBUTOR"`, ...).
    ///
    /// Matching is case-insensitive and treats `-` like `_`.
    pub fn from_api_str(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "owner" => AuthorAssociation::Owner,
            "member" => AuthorAssociation::Member,
            "collaborator" => AuthorAssociation::Collaborator,
            "contributor" => AuthorAssociation::Contributor,
            "first_timer" => AuthorAssociation::FirstTimer,
            "first_time_contributor" => AuthorAssociation::FirstTimeContributor,
            "mannequin" => AuthorAssociation::Mannequin,
            "none" | "" => AuthorAssociation::None,
            _ => AuthorAssociation::Other(s.to_string()),
        }
    }

    /// Returns true for associations that may trigger reruns on their own.
    ///
    /// Only `collaborator`, `contributor`, `member` and `owner` qualify.
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            AuthorAssociation::Owner
                | AuthorAssociation::Member
                | AuthorAssociation::Collaborator
                | AuthorAssociation::Contributor
        )
    }
}

/// The actor who wrote the comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub login: String,
    pub association: Option<AuthorAssociation>,
}

impl ActorIdentity {
    pub fn new(login: impl Into<String>, association: Option<AuthorAssociation>) -> Self {
        ActorIdentity {
            login: login.into(),
            association,
        }
    }

    /// Whether this actor's association is privileged. Unknown associations are not.
    pub fn is_privileged(&self) -> bool {
        self.association
            .as_ref()
            .is_some_and(AuthorAssociation::is_privileged)
    }
}

/// The issue a comment was posted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueState {
    pub number: PrNumber,
    /// True when the issue is actually a pull request.
    pub is_pull_request: bool,
    pub locked: bool,
    pub labels: BTreeSet<String>,
    /// Login of whoever opened the issue/PR. Runs are filtered by this actor.
    pub author_login: String,
}

impl IssueState {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains(name)
    }
}

/// The pull request behind an issue, as fetched at the start of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestState {
    pub number: PrNumber,
    pub head_sha: Sha,
    pub created_at: DateTime<Utc>,
    pub merged: bool,
}
