//! The rerun decision pipeline.
//!
//! - [`eligibility`]: local checks on the issue and PR
//! - [`selection`]: which run of each targeted workflow to act on
//! - [`executor`]: cancel-then-rerun with per-run failure tolerance
//! - [`pipeline`]: the stages wired together, short-circuiting early

pub mod eligibility;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod selection;

pub use eligibility::{Ineligibility, check_rerunable, is_merged, is_rerunable};
pub use error::PipelineError;
pub use executor::{
    CancelOutcome, ExecutionPolicy, ExecutionSummary, RunOutcome, RunReport, execute_reruns,
};
pub use pipeline::{PipelineOutcome, RerunPipeline};
pub use selection::{is_self_workflow, select_run_for_pr, select_runs, target_workflows};
