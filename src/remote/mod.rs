//! Remote merge-request service.
//!
//! [`RemoteService`] abstracts the MR API so the mapper and the merge
//! orchestrator can be exercised against a mock; [`GitLabClient`] is the
//! production implementation.

mod gitlab;

pub use gitlab::GitLabClient;

use crate::error::Result;
use crate::types::{MergeRequest, RemoteCommit};
use async_trait::async_trait;
use std::time::Duration;

/// Bounded retry policy for operations that wait on the remote.
///
/// The remote applies rebases and merges asynchronously, so "not yet" is an
/// expected answer; these loops retry with a fixed interval but always have a
/// caller-visible bound, surfacing [`crate::error::Error::Timeout`] on
/// exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Fixed sleep between attempts
    pub interval: Duration,
}

impl RetryPolicy {
    /// Build a policy from explicit bounds
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Default for merge acceptance: 2 s between attempts, ~5 minutes total
    pub const fn merge_default() -> Self {
        Self::new(150, Duration::from_secs(2))
    }

    /// Default for the stability poll: 500 ms between refreshes, ~5 minutes
    /// total
    pub const fn poll_default() -> Self {
        Self::new(600, Duration::from_millis(500))
    }
}

/// Typed request/response operations against the remote MR API.
///
/// All calls run under one authenticated session; implementations are
/// read-only after construction and safe to share across sequential calls.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Create the MR remotely, filling in `iid` and `web_url`.
    ///
    /// Any non-2xx response is fatal and carries the response body.
    async fn create(&self, mr: &mut MergeRequest) -> Result<()>;

    /// Persist the MR's full current state, refreshing `iid`/`web_url` from
    /// the response (the remote may reassign display fields).
    async fn update(&self, mr: &mut MergeRequest) -> Result<()>;

    /// Persist the MR only if it has unsaved changes.
    ///
    /// Returns whether an update was actually sent; the dirty bit is cleared
    /// either way.
    async fn save(&self, mr: &mut MergeRequest) -> Result<bool> {
        if mr.needs_save() {
            self.update(mr).await?;
            mr.mark_saved();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Ask the remote to rebase the source branch onto the target branch.
    ///
    /// Completion is asynchronous on the remote; this does not wait for it.
    async fn rebase(&self, mr: &MergeRequest) -> Result<()>;

    /// Merge the MR, retrying any non-success status under `retry`.
    ///
    /// "Not yet mergeable" is transient on the remote, so every non-success
    /// response is retried; policy exhaustion is a timeout error.
    async fn merge(&self, mr: &MergeRequest, retry: &RetryPolicy) -> Result<()>;

    /// Delete the MR remotely.
    async fn delete(&self, mr: &MergeRequest) -> Result<()>;

    /// Re-fetch the MR and overwrite all server-derived fields in place.
    async fn refresh(&self, mr: &mut MergeRequest) -> Result<()>;

    /// List the commits currently in the MR.
    async fn get_commits(&self, mr: &MergeRequest) -> Result<Vec<RemoteCommit>>;

    /// List this user's open MRs whose source branch starts with `prefix`.
    ///
    /// Paginates until the first empty page; any transport or HTTP error
    /// aborts the whole listing.
    async fn list_open(&self, prefix: &str) -> Result<Vec<MergeRequest>>;
}
