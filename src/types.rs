//! Core types for stacklab

use crate::error::{Error, Result};

/// A local commit in the stack, one per intended merge request.
///
/// Ephemeral: recomputed from current history on every run. The branch labels
/// are derived from the commit's position in the stack by the git layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full commit hash (hex)
    pub id: String,
    /// Full commit message (first line = title, remainder = description)
    pub message: String,
    /// Branch this commit's MR is created from, unique per stack position
    pub source_branch: String,
    /// Branch the MR lands on: the previous stack entry's source branch, or
    /// the configured base branch for the first commit
    pub target_branch: String,
}

impl Commit {
    /// First line of the commit message
    pub fn title(&self) -> &str {
        split_message(&self.message).0
    }

    /// Commit message body, trimmed of leading/trailing whitespace
    pub fn description(&self) -> &str {
        split_message(&self.message).1
    }
}

/// Split a commit message into (title, description).
///
/// Title is the first line; the description is everything after it with
/// leading/trailing whitespace trimmed but internal line breaks preserved.
/// A message with no body yields an empty description.
pub fn split_message(message: &str) -> (&str, &str) {
    match message.split_once('\n') {
        Some((title, rest)) => (title.trim_end(), rest.trim()),
        None => (message.trim_end(), ""),
    }
}

/// Server-derived fields of a merge request, as one hydration unit.
///
/// Produced by the GitLab client from an API response (a strict decode with a
/// fixed schema, not a dynamic attribute map) and applied to a
/// [`MergeRequest`] wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMrFields {
    /// Remote-assigned MR id within the project
    pub iid: u64,
    /// Source branch as the remote sees it
    pub source_branch: String,
    /// Target branch as the remote sees it
    pub target_branch: String,
    /// Title as the remote sees it
    pub title: String,
    /// Description as the remote sees it (empty if absent)
    pub description: String,
    /// Web URL of the MR
    pub web_url: String,
    /// Whether the remote reports the MR as mergeable
    pub mergeable: bool,
    /// Tip commit the remote currently has for the source branch
    pub sha: Option<String>,
}

/// A commit as reported by the remote for an MR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommit {
    /// Full commit hash (hex)
    pub id: String,
    /// Commit title
    pub title: String,
}

/// A merge request: one link in the chain.
///
/// Content mutators are equality-gated: setting a field to its current value
/// is a no-op and does not mark the record dirty. The dirty bit
/// (`needs_save`) is local-only and cleared when the remote confirms an
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    iid: Option<u64>,
    source_branch: String,
    target_branch: String,
    title: String,
    description: String,
    web_url: Option<String>,
    mergeable: bool,
    sha: Option<String>,
    needs_save: bool,
}

impl MergeRequest {
    /// Create an in-memory MR that does not yet exist remotely
    pub fn new(
        source_branch: impl Into<String>,
        target_branch: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            iid: None,
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            title: title.into(),
            description: description.into(),
            web_url: None,
            mergeable: false,
            sha: None,
            needs_save: false,
        }
    }

    /// Build a create-intent MR from a local commit
    pub fn from_commit(commit: &Commit) -> Self {
        Self::new(
            commit.source_branch.clone(),
            commit.target_branch.clone(),
            commit.title(),
            commit.description(),
        )
    }

    /// Hydrate an MR from a remote API response
    pub fn from_remote(fields: RemoteMrFields) -> Self {
        Self {
            iid: Some(fields.iid),
            source_branch: fields.source_branch,
            target_branch: fields.target_branch,
            title: fields.title,
            description: fields.description,
            web_url: Some(fields.web_url),
            mergeable: fields.mergeable,
            sha: fields.sha,
            needs_save: false,
        }
    }

    /// Remote-assigned id, `None` until created
    pub const fn iid(&self) -> Option<u64> {
        self.iid
    }

    /// Source branch (unique per chain position)
    pub fn source_branch(&self) -> &str {
        &self.source_branch
    }

    /// Target branch (previous stack entry's source, or the base branch)
    pub fn target_branch(&self) -> &str {
        &self.target_branch
    }

    /// MR title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// MR description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Web URL, available once created
    pub fn web_url(&self) -> Option<&str> {
        self.web_url.as_deref()
    }

    /// Whether the remote reports the MR as mergeable
    pub const fn mergeable(&self) -> bool {
        self.mergeable
    }

    /// Tip commit the remote currently has for the source branch
    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    /// Whether a content mutation is pending persistence
    pub const fn needs_save(&self) -> bool {
        self.needs_save
    }

    /// The local branch this MR's source branch was derived from, recovered
    /// by stripping the positional suffix.
    pub fn local_branch(&self) -> &str {
        match self.source_branch.rsplit_once('-') {
            Some((prefix, _)) => prefix,
            None => &self.source_branch,
        }
    }

    /// Set the target branch; dirty only if the value actually changes
    pub fn set_target_branch(&mut self, target_branch: &str) {
        if self.target_branch != target_branch {
            self.target_branch = target_branch.to_string();
            self.needs_save = true;
        }
    }

    /// Set the title; dirty only if the value actually changes
    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.needs_save = true;
        }
    }

    /// Set the description.
    ///
    /// Compared after trimming both sides: the remote normalizes trailing
    /// whitespace, so a trim-equal description is not a real change.
    pub fn set_description(&mut self, description: &str) {
        if self.description.trim() != description.trim() {
            self.description = description.to_string();
            self.needs_save = true;
        }
    }

    /// Whether this MR's content is stale relative to the given commit.
    ///
    /// False iff source branch, target branch, title, and description
    /// (descriptions compared after trimming both sides) all match.
    pub fn needs_update(&self, commit: &Commit) -> bool {
        self.source_branch != commit.source_branch
            || self.target_branch != commit.target_branch
            || self.title != commit.title()
            || self.description.trim() != commit.description()
    }

    /// Record the identity the remote assigned at creation time
    pub fn record_created(&mut self, iid: u64, web_url: String) {
        self.iid = Some(iid);
        self.web_url = Some(web_url);
    }

    /// Overwrite all server-derived fields in place from a fresh fetch.
    ///
    /// Leaves the dirty bit untouched: a refresh is not a save.
    pub fn apply_remote(&mut self, fields: RemoteMrFields) {
        self.iid = Some(fields.iid);
        self.source_branch = fields.source_branch;
        self.target_branch = fields.target_branch;
        self.title = fields.title;
        self.description = fields.description;
        self.web_url = Some(fields.web_url);
        self.mergeable = fields.mergeable;
        self.sha = fields.sha;
    }

    /// Clear the dirty bit after a successful remote update
    pub fn mark_saved(&mut self) {
        self.needs_save = false;
    }

    /// The remote id, or [`Error::NotCreated`] if this MR was never created
    pub fn require_iid(&self) -> Result<u64> {
        self.iid
            .ok_or_else(|| Error::NotCreated(self.source_branch.clone()))
    }
}
