//! Merge orchestration: land the chain in dependency order.
//!
//! The remote applies rebases and merges asynchronously, so each link goes
//! through rebase -> poll-until-stable -> merge before the next link is
//! touched. Merging runs bottom-of-stack first: merging a child before its
//! parent would change what the child's target branch actually contains.

use crate::error::{Error, Result};
use crate::remote::{RemoteService, RetryPolicy};
use crate::types::{Commit, MergeRequest};
use tracing::debug;

/// Result of a merge run over the chain
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Source branches merged, in merge order
    pub merged: Vec<String>,
    /// The link where the run stopped, if any
    pub failed: Option<String>,
    /// Why the failing link stopped the run
    pub error_message: Option<String>,
}

impl MergeOutcome {
    /// Whether every link in the chain merged
    pub const fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Retry policies for the two wait loops in a merge run
#[derive(Debug, Clone, Copy)]
pub struct MergePolicies {
    /// Policy for the stability poll (refresh until sha matches)
    pub poll: RetryPolicy,
    /// Policy for merge acceptance
    pub merge: RetryPolicy,
}

impl Default for MergePolicies {
    fn default() -> Self {
        Self {
            poll: RetryPolicy::poll_default(),
            merge: RetryPolicy::merge_default(),
        }
    }
}

/// Merge an ordered chain (root to leaf), one link at a time.
///
/// Each link's matching local commit supplies the expected sha. The run stops
/// at the first link that fails; already-merged links are reported in the
/// outcome either way.
pub async fn merge_chain(
    chain: Vec<MergeRequest>,
    commits: &[Commit],
    remote: &dyn RemoteService,
    policies: &MergePolicies,
) -> Result<MergeOutcome> {
    let mut outcome = MergeOutcome::default();

    for mut mr in chain {
        let commit = commits
            .iter()
            .find(|c| c.source_branch == mr.source_branch())
            .ok_or_else(|| {
                Error::Internal(format!(
                    "no local commit for chain link {}",
                    mr.source_branch()
                ))
            })?;

        match merge_link(&mut mr, commit, remote, policies).await {
            Ok(()) => outcome.merged.push(mr.source_branch().to_string()),
            Err(e) => {
                outcome.failed = Some(mr.source_branch().to_string());
                outcome.error_message = Some(e.to_string());
                break;
            }
        }
    }

    Ok(outcome)
}

/// Land a single chain link: rebase if stale, wait for stability, merge.
async fn merge_link(
    mr: &mut MergeRequest,
    commit: &Commit,
    remote: &dyn RemoteService,
    policies: &MergePolicies,
) -> Result<()> {
    if mr.sha() != Some(commit.id.as_str()) {
        debug!(
            source = mr.source_branch(),
            remote_sha = mr.sha(),
            expected = %commit.id,
            "remote tip is stale, rebasing"
        );
        remote.rebase(mr).await?;
    }

    wait_until_stable(mr, &commit.id, remote, &policies.poll).await?;
    remote.merge(mr, &policies.merge).await
}

/// Poll the MR until the remote's recorded tip equals `expected_sha`.
///
/// Rebase/update completion is asynchronous on the remote; merging a stale
/// revision must never happen, so this gate runs before every merge.
pub async fn wait_until_stable(
    mr: &mut MergeRequest,
    expected_sha: &str,
    remote: &dyn RemoteService,
    policy: &RetryPolicy,
) -> Result<()> {
    for attempt in 1..=policy.max_attempts {
        remote.refresh(mr).await?;
        if mr.sha() == Some(expected_sha) {
            debug!(source = mr.source_branch(), attempt, "remote is stable");
            return Ok(());
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Err(Error::Timeout {
        waiting_for: format!("{} to reach {expected_sha}", mr.source_branch()),
        attempts: policy.max_attempts,
    })
}
