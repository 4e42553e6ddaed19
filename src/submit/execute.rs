//! Submission execution - effectful operations against the remote.

use crate::error::Result;
use crate::remote::RemoteService;
use crate::submit::plan::{SubmitPlan, SubmitStep};
use tracing::debug;

/// Result of executing a submission plan
#[derive(Debug, Clone, Default)]
pub struct SubmitOutcome {
    /// MRs created this run, with their assigned iids and web URLs
    pub created: Vec<crate::types::MergeRequest>,
    /// MRs whose content was updated this run
    pub updated: Vec<crate::types::MergeRequest>,
    /// MRs that already matched their commits
    pub unchanged: Vec<crate::types::MergeRequest>,
}

/// Execute the submission plan (EFFECTFUL).
///
/// Steps run strictly in stack order. Any create/update failure is fatal and
/// propagates immediately with the server's response attached; there is no
/// partial retry.
pub async fn execute_submit(
    plan: SubmitPlan,
    remote: &dyn RemoteService,
) -> Result<SubmitOutcome> {
    let mut outcome = SubmitOutcome::default();

    for step in plan.steps {
        match step {
            SubmitStep::Create(mut mr) => {
                remote.create(&mut mr).await?;
                debug!(source = mr.source_branch(), iid = mr.iid(), "created");
                outcome.created.push(mr);
            }
            SubmitStep::Update(mut mr) => {
                remote.save(&mut mr).await?;
                debug!(source = mr.source_branch(), iid = mr.iid(), "updated");
                outcome.updated.push(mr);
            }
            SubmitStep::Noop(mr) => outcome.unchanged.push(mr),
        }
    }

    Ok(outcome)
}
