//! Rerun Bot - re-runs GitHub Actions workflow runs for a pull request when a
//! trusted user comments `/retest`, `/test NAME` and friends.
//!
//! The decision pipeline ([`rerun`]) is shared by two front ends: a webhook
//! server ([`server`]) and a GitHub Action ([`action`]). All GitHub access
//! goes through effects ([`effects`]) interpreted by [`github`].

pub mod action;
pub mod auth;
pub mod commands;
pub mod config;
pub mod context;
pub mod effects;
pub mod github;
pub mod rerun;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;
