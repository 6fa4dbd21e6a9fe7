//! Allow/deny login patterns.

use regex::Regex;
use thiserror::Error;

/// A user pattern that failed to compile.
#[derive(Debug, Error)]
#[error("invalid {list} pattern {pattern:?}: {source}")]
pub struct InvalidPattern {
    /// Which list the pattern came from (`allow` or `deny`).
    pub list: &'static str,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compiled allow and deny lists applied to commenter logins.
///
/// An actor passes iff it matches **every** allow pattern (or the allow list is
/// empty) and matches **no** deny pattern. Deny always wins. Patterns are
/// unanchored, as with [`Regex::is_match`].
#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    allow: Vec<Regex>,
    deny: Vec<Regex>,
}

impl AuthorizationPolicy {
    /// A policy that lets everyone through.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Compiles both lists. Any invalid pattern fails the whole policy.
    pub fn compile<A, D>(allow: A, deny: D) -> Result<Self, InvalidPattern>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Ok(AuthorizationPolicy {
            allow: compile_list("allow", allow)?,
            deny: compile_list("deny", deny)?,
        })
    }

    pub fn is_authorized(&self, login: &str) -> bool {
        if !self.allow.iter().all(|re| re.is_match(login)) {
            return false;
        }
        !self.deny.iter().any(|re| re.is_match(login))
    }

    pub fn is_permissive(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

fn compile_list<I>(list: &'static str, patterns: I) -> Result<Vec<Regex>, InvalidPattern>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| {
            let pattern = p.as_ref();
            Regex::new(pattern).map_err(|source| InvalidPattern {
                list,
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}
