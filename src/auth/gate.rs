//! The authorization gate combining label, association and login checks.

use serde::{Deserialize, Serialize};

use crate::types::{ActorIdentity, IssueState};

use super::policy::AuthorizationPolicy;

/// Label that grants rerun permission when no other labels are configured.
pub const DEFAULT_RERUN_LABEL: &str = "ok-to-test";

/// One independent permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCheck {
    /// The issue carries one of the rerun labels.
    OkToTestLabel,
    /// The commenter is an owner, member, collaborator or contributor.
    PrivilegedAssociation,
    /// The commenter's login passes the allow/deny patterns.
    UserPolicy,
}

/// How the configured checks are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    /// Every check must pass.
    #[default]
    All,
    /// At least one check must pass.
    Any,
}

/// Result of evaluating the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Permitted,
    /// The checks that failed. In `All` mode this is the first failure only.
    Denied { failed: Vec<GateCheck> },
}

impl GateDecision {
    pub fn is_permitted(&self) -> bool {
        matches!(self, GateDecision::Permitted)
    }
}

/// Returns true if the issue carries any of `labels`.
pub fn has_rerun_label<S: AsRef<str>>(issue: &IssueState, labels: &[S]) -> bool {
    labels.iter().any(|l| issue.has_label(l.as_ref()))
}

/// Decides whether a commenter may trigger reruns on an issue.
///
/// The combination of checks is chosen at deployment time. Typical setups:
///
/// - `All[OkToTestLabel, UserPolicy]`: the PR must be labelled and the
///   commenter must pass the login patterns
/// - `Any[OkToTestLabel, PrivilegedAssociation]`: either the PR is labelled or
///   the commenter is a trusted member of the repository
///
/// An empty check list permits everything.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    checks: Vec<GateCheck>,
    mode: GateMode,
    labels: Vec<String>,
    policy: AuthorizationPolicy,
}

impl AuthorizationGate {
    pub fn new(
        checks: Vec<GateCheck>,
        mode: GateMode,
        labels: Vec<String>,
        policy: AuthorizationPolicy,
    ) -> Self {
        AuthorizationGate {
            checks,
            mode,
            labels,
            policy,
        }
    }

    /// Label-and-patterns gate with the default `ok-to-test` label.
    pub fn label_and_user_policy(policy: AuthorizationPolicy) -> Self {
        Self::new(
            vec![GateCheck::OkToTestLabel, GateCheck::UserPolicy],
            GateMode::All,
            vec![DEFAULT_RERUN_LABEL.to_string()],
            policy,
        )
    }

    /// Label-or-privilege gate with the default `ok-to-test` label.
    pub fn label_or_privileged() -> Self {
        Self::new(
            vec![GateCheck::OkToTestLabel, GateCheck::PrivilegedAssociation],
            GateMode::Any,
            vec![DEFAULT_RERUN_LABEL.to_string()],
            AuthorizationPolicy::permissive(),
        )
    }

    pub fn checks(&self) -> &[GateCheck] {
        &self.checks
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    /// Evaluates a single check.
    pub fn check(&self, check: GateCheck, actor: &ActorIdentity, issue: &IssueState) -> bool {
        match check {
            GateCheck::OkToTestLabel => has_rerun_label(issue, &self.labels),
            GateCheck::PrivilegedAssociation => actor.is_privileged(),
            GateCheck::UserPolicy => self.policy.is_authorized(&actor.login),
        }
    }

    /// Evaluates the checks in order, short-circuiting.
    pub fn evaluate(&self, actor: &ActorIdentity, issue: &IssueState) -> GateDecision {
        if self.checks.is_empty() {
            return GateDecision::Permitted;
        }

        match self.mode {
            GateMode::All => {
                for &check in &self.checks {
                    if !self.check(check, actor, issue) {
                        return GateDecision::Denied {
                            failed: vec![check],
                        };
                    }
                }
                GateDecision::Permitted
            }
            GateMode::Any => {
                let mut failed = Vec::with_capacity(self.checks.len());
                for &check in &self.checks {
                    if self.check(check, actor, issue) {
                        return GateDecision::Permitted;
                    }
                    failed.push(check);
                }
                GateDecision::Denied { failed }
            }
        }
    }
}
