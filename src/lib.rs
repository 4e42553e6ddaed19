//! Stacked merge requests for GitLab.
//!
//! stacklab turns a linear sequence of local commits into a chain of
//! dependent merge requests (one MR per commit, each targeting the branch of
//! the previous one), keeps that chain synchronized as commits are amended or
//! reordered, and merges the chain in dependency order once each MR is
//! mergeable.

pub mod chain;
pub mod config;
pub mod error;
pub mod git;
pub mod merge;
pub mod remote;
pub mod submit;
pub mod types;
