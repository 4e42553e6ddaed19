//! Chain reconstruction: order a flat set of merge requests parent-before-child.
//!
//! The remote API returns MRs as an unordered collection; the dependency
//! order is encoded in the branch links (each non-root MR targets exactly one
//! sibling's source branch). This module rebuilds that order and rejects
//! malformed inputs instead of hanging on them.

use crate::error::{Error, Result};
use crate::types::MergeRequest;
use std::collections::{HashMap, HashSet};

/// Order an unordered set of MRs into root-to-leaf chains.
///
/// A root is an MR whose target branch is not the source branch of any
/// sibling (its parent is outside the stack, typically the base branch).
/// Each root's chain is followed via target-branch links; chains from
/// multiple independent roots are concatenated in root-discovery order.
///
/// # Errors
///
/// Returns [`Error::MalformedChain`] when two MRs target the same branch,
/// when the links form a cycle, or when members are unreachable from any
/// root.
pub fn build_chain(mrs: Vec<MergeRequest>) -> Result<Vec<MergeRequest>> {
    if mrs.is_empty() {
        return Ok(Vec::new());
    }

    let sources: HashSet<&str> = mrs.iter().map(MergeRequest::source_branch).collect();

    // Successor lookup: the index of the MR targeting a given source branch.
    // At most one MR may target any branch within the chain.
    let mut by_target: HashMap<&str, usize> = HashMap::new();
    for (idx, mr) in mrs.iter().enumerate() {
        if let Some(prev) = by_target.insert(mr.target_branch(), idx) {
            return Err(Error::MalformedChain(format!(
                "both {} and {} target {}",
                mrs[prev].source_branch(),
                mr.source_branch(),
                mr.target_branch(),
            )));
        }
    }

    let roots: Vec<usize> = mrs
        .iter()
        .enumerate()
        .filter(|(_, mr)| !sources.contains(mr.target_branch()))
        .map(|(idx, _)| idx)
        .collect();

    let mut order: Vec<usize> = Vec::with_capacity(mrs.len());
    let mut visited: HashSet<usize> = HashSet::with_capacity(mrs.len());
    for root in roots {
        let mut current = root;
        loop {
            if !visited.insert(current) {
                return Err(Error::MalformedChain(format!(
                    "cycle detected at {}",
                    mrs[current].source_branch(),
                )));
            }
            order.push(current);
            match by_target.get(mrs[current].source_branch()) {
                Some(&next) => current = next,
                None => break,
            }
        }
    }

    // Anything not reached from a root sits on a cycle (a pure cycle has no
    // root to start from, so the walk above never enters it).
    if order.len() != mrs.len() {
        let stranded: Vec<&str> = mrs
            .iter()
            .enumerate()
            .filter(|(idx, _)| !visited.contains(idx))
            .map(|(_, mr)| mr.source_branch())
            .collect();
        return Err(Error::MalformedChain(format!(
            "cycle: {} unreachable from any root",
            stranded.join(", "),
        )));
    }

    let mut slots: Vec<Option<MergeRequest>> = mrs.into_iter().map(Some).collect();
    order
        .into_iter()
        .map(|idx| slots[idx].take())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| Error::Internal("chain index visited twice".to_string()))
}
