//! Cheap local checks that run before any API call.

use serde::{Deserialize, Serialize};

use crate::types::{IssueState, PullRequestState};

/// Why an issue can't have its runs rerun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ineligibility {
    NotPullRequest,
    Locked,
}

/// Returns true iff the issue is an unlocked pull request.
pub fn is_rerunable(issue: &IssueState) -> bool {
    check_rerunable(issue).is_ok()
}

/// Like [`is_rerunable`], but says which condition failed.
pub fn check_rerunable(issue: &IssueState) -> Result<(), Ineligibility> {
    if !issue.is_pull_request {
        return Err(Ineligibility::NotPullRequest);
    }
    if issue.locked {
        return Err(Ineligibility::Locked);
    }
    Ok(())
}

pub fn is_merged(pr: &PullRequestState) -> bool {
    pr.merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{issue_with_labels, pull_request};

    #[test]
    fn only_unlocked_pull_requests_are_rerunable() {
        let open = issue_with_labels(&[]);
        assert!(is_rerunable(&open));

        let locked = IssueState {
            locked: true,
            ..open.clone()
        };
        assert_eq!(check_rerunable(&locked), Err(Ineligibility::Locked));

        let plain_issue = IssueState {
            is_pull_request: false,
            ..open.clone()
        };
        assert_eq!(
            check_rerunable(&plain_issue),
            Err(Ineligibility::NotPullRequest)
        );

        let locked_issue = IssueState {
            is_pull_request: false,
            locked: true,
            ..open
        };
        assert!(!is_rerunable(&locked_issue));
    }

    #[test]
    fn merged_flag() {
        let pr = pull_request();
        assert!(!is_merged(&pr));
        assert!(is_merged(&PullRequestState { merged: true, ..pr }));
    }
}
