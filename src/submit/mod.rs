//! Submission: reconcile the local commit stack with the live MRs.
//!
//! Split into a pure planning half ([`plan`]) and an effectful execution half
//! ([`execute`]) so the reconciliation decisions can be unit tested without a
//! remote.

mod execute;
mod plan;

pub use execute::{execute_submit, SubmitOutcome};
pub use plan::{create_submit_plan, SubmitPlan, SubmitStep};
