//! Mock remote service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use stacklab::error::{Error, Result};
use stacklab::remote::{RemoteService, RetryPolicy};
use stacklab::types::{MergeRequest, RemoteCommit, RemoteMrFields};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Call record for `create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCall {
    pub source_branch: String,
    pub target_branch: String,
    pub title: String,
}

/// Call record for `update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub iid: u64,
    pub target_branch: String,
    pub title: String,
    pub description: String,
}

/// Simple mock remote service for testing
///
/// Features:
/// - Auto-incrementing MR iids on create
/// - Call tracking for verification
/// - Scripted refresh responses per branch (sha sequences, last repeats)
/// - Error injection for failure path testing
pub struct MockRemoteService {
    next_iid: AtomicU64,
    list_open_response: Mutex<Vec<MergeRequest>>,
    refresh_sha_scripts: Mutex<HashMap<String, VecDeque<Option<String>>>>,
    commits_responses: Mutex<HashMap<String, Vec<RemoteCommit>>>,
    // Call tracking
    create_calls: Mutex<Vec<CreateCall>>,
    update_calls: Mutex<Vec<UpdateCall>>,
    rebase_calls: Mutex<Vec<String>>,
    merge_calls: Mutex<Vec<String>>,
    refresh_calls: Mutex<Vec<String>>,
    delete_calls: Mutex<Vec<String>>,
    list_open_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_create: Mutex<Option<String>>,
    error_on_update: Mutex<Option<String>>,
    merge_failures: Mutex<HashMap<String, String>>,
}

impl MockRemoteService {
    pub fn new() -> Self {
        Self {
            next_iid: AtomicU64::new(1),
            list_open_response: Mutex::new(Vec::new()),
            refresh_sha_scripts: Mutex::new(HashMap::new()),
            commits_responses: Mutex::new(HashMap::new()),
            create_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
            rebase_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            refresh_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            list_open_calls: Mutex::new(Vec::new()),
            error_on_create: Mutex::new(None),
            error_on_update: Mutex::new(None),
            merge_failures: Mutex::new(HashMap::new()),
        }
    }

    // === Response configuration ===

    /// Set the MRs returned by `list_open`
    pub fn set_list_open_response(&self, mrs: Vec<MergeRequest>) {
        *self.list_open_response.lock().unwrap() = mrs;
    }

    /// Script the shas successive `refresh` calls report for a branch.
    ///
    /// The last sha repeats once the script is exhausted. Branches without a
    /// script keep whatever sha the MR already carries.
    pub fn set_refresh_shas(&self, branch: &str, shas: &[&str]) {
        self.refresh_sha_scripts.lock().unwrap().insert(
            branch.to_string(),
            shas.iter().map(|s| Some((*s).to_string())).collect(),
        );
    }

    /// Set the commits returned by `get_commits` for a branch
    pub fn set_commits_response(&self, branch: &str, commits: Vec<RemoteCommit>) {
        self.commits_responses
            .lock()
            .unwrap()
            .insert(branch.to_string(), commits);
    }

    // === Error injection methods ===

    /// Make `create` return an error
    pub fn fail_create(&self, msg: &str) {
        *self.error_on_create.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `update` return an error
    pub fn fail_update(&self, msg: &str) {
        *self.error_on_update.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge` fail for a specific branch
    pub fn fail_merge(&self, branch: &str, msg: &str) {
        self.merge_failures
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    // === Call verification methods ===

    pub fn get_create_calls(&self) -> Vec<CreateCall> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn get_update_calls(&self) -> Vec<UpdateCall> {
        self.update_calls.lock().unwrap().clone()
    }

    pub fn get_rebase_calls(&self) -> Vec<String> {
        self.rebase_calls.lock().unwrap().clone()
    }

    pub fn get_merge_calls(&self) -> Vec<String> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn get_refresh_calls(&self) -> Vec<String> {
        self.refresh_calls.lock().unwrap().clone()
    }

    pub fn get_delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    pub fn refresh_call_count(&self, branch: &str) -> usize {
        self.refresh_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.as_str() == branch)
            .count()
    }

    /// Assert that `rebase` was NOT called for a specific branch
    pub fn assert_rebase_not_called(&self, branch: &str) {
        let calls = self.get_rebase_calls();
        assert!(
            !calls.iter().any(|b| b == branch),
            "Expected rebase({branch}) NOT to be called but it was: {calls:?}"
        );
    }

    /// Assert that `merge` was NOT called for a specific branch
    pub fn assert_merge_not_called(&self, branch: &str) {
        let calls = self.get_merge_calls();
        assert!(
            !calls.iter().any(|b| b == branch),
            "Expected merge({branch}) NOT to be called but it was: {calls:?}"
        );
    }

    fn scripted_sha(&self, mr: &MergeRequest) -> Option<String> {
        let mut scripts = self.refresh_sha_scripts.lock().unwrap();
        match scripts.get_mut(mr.source_branch()) {
            Some(script) if script.len() > 1 => script.pop_front().flatten(),
            Some(script) => script.front().cloned().flatten(),
            None => mr.sha().map(ToString::to_string),
        }
    }
}

impl Default for MockRemoteService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteService for MockRemoteService {
    async fn create(&self, mr: &mut MergeRequest) -> Result<()> {
        self.create_calls.lock().unwrap().push(CreateCall {
            source_branch: mr.source_branch().to_string(),
            target_branch: mr.target_branch().to_string(),
            title: mr.title().to_string(),
        });

        if let Some(msg) = self.error_on_create.lock().unwrap().as_ref() {
            return Err(Error::Api {
                context: "creating merge request",
                status: 409,
                body: msg.clone(),
                source_branch: mr.source_branch().to_string(),
                target_branch: mr.target_branch().to_string(),
            });
        }

        let iid = self.next_iid.fetch_add(1, Ordering::SeqCst);
        mr.record_created(iid, format!("https://gitlab.example.com/mrs/{iid}"));
        Ok(())
    }

    async fn update(&self, mr: &mut MergeRequest) -> Result<()> {
        self.update_calls.lock().unwrap().push(UpdateCall {
            iid: mr.require_iid()?,
            target_branch: mr.target_branch().to_string(),
            title: mr.title().to_string(),
            description: mr.description().to_string(),
        });

        if let Some(msg) = self.error_on_update.lock().unwrap().as_ref() {
            return Err(Error::Api {
                context: "updating merge request",
                status: 422,
                body: msg.clone(),
                source_branch: mr.source_branch().to_string(),
                target_branch: mr.target_branch().to_string(),
            });
        }
        Ok(())
    }

    async fn rebase(&self, mr: &MergeRequest) -> Result<()> {
        mr.require_iid()?;
        self.rebase_calls
            .lock()
            .unwrap()
            .push(mr.source_branch().to_string());
        Ok(())
    }

    async fn merge(&self, mr: &MergeRequest, _retry: &RetryPolicy) -> Result<()> {
        mr.require_iid()?;
        self.merge_calls
            .lock()
            .unwrap()
            .push(mr.source_branch().to_string());

        if let Some(msg) = self.merge_failures.lock().unwrap().get(mr.source_branch()) {
            return Err(Error::Api {
                context: "merging merge request",
                status: 405,
                body: msg.clone(),
                source_branch: mr.source_branch().to_string(),
                target_branch: mr.target_branch().to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, mr: &MergeRequest) -> Result<()> {
        mr.require_iid()?;
        self.delete_calls
            .lock()
            .unwrap()
            .push(mr.source_branch().to_string());
        Ok(())
    }

    async fn refresh(&self, mr: &mut MergeRequest) -> Result<()> {
        self.refresh_calls
            .lock()
            .unwrap()
            .push(mr.source_branch().to_string());

        let fields = RemoteMrFields {
            iid: mr.require_iid()?,
            source_branch: mr.source_branch().to_string(),
            target_branch: mr.target_branch().to_string(),
            title: mr.title().to_string(),
            description: mr.description().to_string(),
            web_url: mr.web_url().unwrap_or_default().to_string(),
            mergeable: true,
            sha: self.scripted_sha(mr),
        };
        mr.apply_remote(fields);
        Ok(())
    }

    async fn get_commits(&self, mr: &MergeRequest) -> Result<Vec<RemoteCommit>> {
        mr.require_iid()?;
        Ok(self
            .commits_responses
            .lock()
            .unwrap()
            .get(mr.source_branch())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_open(&self, prefix: &str) -> Result<Vec<MergeRequest>> {
        self.list_open_calls.lock().unwrap().push(prefix.to_string());
        Ok(self
            .list_open_response
            .lock()
            .unwrap()
            .iter()
            .filter(|mr| mr.source_branch().starts_with(prefix))
            .cloned()
            .collect())
    }
}
