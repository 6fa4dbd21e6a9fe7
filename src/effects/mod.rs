//! Effects-as-data for GitHub operations.
//!
//! The decision pipeline describes every GitHub call it needs as a
//! [`GitHubEffect`] and hands it to a [`GitHubInterpreter`]. This keeps the
//! core free of HTTP details and lets tests assert on exactly which calls were
//! made, and in which order.

pub mod github;
pub mod interpreter;

pub use github::{CommentData, GitHubEffect, GitHubResponse, PULL_REQUEST_EVENT};
pub use interpreter::GitHubInterpreter;
