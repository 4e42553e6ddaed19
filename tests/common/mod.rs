//! Shared test fixtures

#![allow(dead_code)]

pub mod mock_remote;

use stacklab::types::{Commit, MergeRequest, RemoteMrFields};

/// Build a stack commit at position `n` on `feat`, targeting `master` at the
/// root
pub fn make_commit(n: u32, message: &str) -> Commit {
    Commit {
        id: format!("sha-{n}"),
        message: message.to_string(),
        source_branch: format!("feat-{n}"),
        target_branch: if n == 1 {
            "master".to_string()
        } else {
            format!("feat-{}", n - 1)
        },
    }
}

/// Build a live MR as the remote would report it
pub fn make_live_mr(iid: u64, source: &str, target: &str, title: &str, sha: &str) -> MergeRequest {
    MergeRequest::from_remote(RemoteMrFields {
        iid,
        source_branch: source.to_string(),
        target_branch: target.to_string(),
        title: title.to_string(),
        description: String::new(),
        web_url: format!("https://gitlab.example.com/mrs/{iid}"),
        mergeable: true,
        sha: Some(sha.to_string()),
    })
}
