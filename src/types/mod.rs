//! Core domain types for the rerun bot.
//!
//! Every value here is a read-only snapshot of GitHub state taken during a
//! single invocation.

pub mod ids;
pub mod issue;
pub mod workflow;

pub use ids::{CommentId, DeliveryId, InvalidRepoId, PrNumber, RepoId, RunId, Sha, WorkflowId};
pub use issue::{ActorIdentity, AuthorAssociation, IssueState, PullRequestState};
pub use workflow::{RunConclusion, RunStatus, Workflow, WorkflowRun, WorkflowState};
