//! GitHub API client and effect interpreter.
//!
//! Executes [`GitHubEffect`](crate::effects::GitHubEffect)s against the REST
//! API through octocrab. Each effect is a single attempt: failures are
//! classified as transient or permanent for logging, but never retried.

mod client;
mod error;
mod interpreter;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::{interpret_github_effect, issue_number_from_url};
