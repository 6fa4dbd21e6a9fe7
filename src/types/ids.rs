//! Newtype wrappers for GitHub identifiers.
//!
//! These keep run ids, workflow ids, comment ids and PR numbers from being
//! mixed up, since all of them are plain integers on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A pull request (or issue) number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrNumber(pub u64);

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PrNumber {
    fn from(n: u64) -> Self {
        PrNumber(n)
    }
}

/// A GitHub issue comment ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CommentId {
    fn from(n: u64) -> Self {
        CommentId(n)
    }
}

/// A GitHub Actions workflow ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub u64);

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A GitHub Actions workflow run ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A git commit SHA.
///
/// Compared as an opaque string: the head SHA of a run is matched against the
/// head SHA of a PR exactly as GitHub reports both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(pub String);

impl Sha {
    pub fn new(s: impl Into<String>) -> Self {
        Sha(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version of the SHA for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Sha(s.to_string())
    }
}

/// Error returned when an `owner/name` string cannot be split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid repository {0:?}, expected owner/name")]
pub struct InvalidRepoId(pub String);

/// A repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses an `owner/name` string such as the value of `GITHUB_REPOSITORY`.
    ///
    /// Surrounding slashes are tolerated; both halves must be non-empty and the
    /// name must not contain a further `/`.
    pub fn parse(s: &str) -> Result<Self, InvalidRepoId> {
        let trimmed = s.trim().trim_matches('/');
        let (owner, repo) = trimmed
            .split_once('/')
            .ok_or_else(|| InvalidRepoId(s.to_string()))?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(InvalidRepoId(s.to_string()));
        }
        Ok(RepoId::new(owner, repo))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A GitHub webhook delivery ID (the `X-GitHub-Delivery` header).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod repo_id {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_display_roundtrip(
                owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
                repo in "[a-zA-Z][a-zA-Z0-9_.-]{0,99}"
            ) {
                let id = RepoId::new(&owner, &repo);
                prop_assert_eq!(RepoId::parse(&id.to_string()), Ok(id));
            }
        }

        #[test]
        fn parse_tolerates_surrounding_slashes() {
            assert_eq!(
                RepoId::parse("/octocat/hello-world/"),
                Ok(RepoId::new("octocat", "hello-world"))
            );
        }

        #[test]
        fn parse_rejects_malformed() {
            assert!(RepoId::parse("").is_err());
            assert!(RepoId::parse("octocat").is_err());
            assert!(RepoId::parse("octocat/").is_err());
            assert!(RepoId::parse("/hello-world").is_err());
            assert!(RepoId::parse("a/b/c").is_err());
        }
    }

    mod sha {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn short_returns_7_chars(s in "[0-9a-f]{40}") {
                let sha = Sha::new(&s);
                prop_assert_eq!(sha.short(), &s[..7]);
            }
        }

        #[test]
        fn short_handles_short_input() {
            assert_eq!(Sha::new("abc").short(), "abc");
        }
    }

    #[test]
    fn display_formats() {
        assert_eq!(PrNumber(42).to_string(), "#42");
        assert_eq!(RunId(7).to_string(), "7");
        assert_eq!(WorkflowId(3).to_string(), "3");
        assert_eq!(CommentId(9).to_string(), "9");
        assert_eq!(DeliveryId::new("abc").to_string(), "abc");
    }
}
