//! Who may trigger reruns.
//!
//! Three independent checks are available: an "ok-to-test" label on the
//! issue, the commenter's author association, and allow/deny regular
//! expressions over the commenter's login. Deployments pick which checks apply
//! and whether all or any of them must pass.

mod gate;
mod policy;

pub use gate::{
    AuthorizationGate, DEFAULT_RERUN_LABEL, GateCheck, GateDecision, GateMode, has_rerun_label,
};
pub use policy::{AuthorizationPolicy, InvalidPattern};
