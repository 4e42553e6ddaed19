//! Submission planning - pure functions for mapping commits to MR intents.
//!
//! No I/O happens here: the live MRs are fetched beforehand by the caller,
//! making the per-commit create/update/no-op decision easy to unit test.

use crate::types::{Commit, MergeRequest};
use std::collections::HashMap;

/// The reconciliation decision for one commit in the stack
#[derive(Debug, Clone)]
pub enum SubmitStep {
    /// No MR exists for this commit's source branch yet
    Create(MergeRequest),
    /// An MR exists but its content is stale; carries the MR with the new
    /// values applied and the dirty bit set
    Update(MergeRequest),
    /// An MR exists and already matches the commit
    Noop(MergeRequest),
}

impl SubmitStep {
    /// The MR this step concerns
    pub const fn mr(&self) -> &MergeRequest {
        match self {
            Self::Create(mr) | Self::Update(mr) | Self::Noop(mr) => mr,
        }
    }
}

impl std::fmt::Display for SubmitStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(mr) => write!(
                f,
                "create {} \u{2192} {}: {}",
                mr.source_branch(),
                mr.target_branch(),
                mr.title()
            ),
            Self::Update(mr) => write!(f, "update {}: {}", mr.source_branch(), mr.title()),
            Self::Noop(mr) => write!(f, "up to date: {}", mr.source_branch()),
        }
    }
}

/// Planned reconciliation for the whole stack
#[derive(Debug, Clone, Default)]
pub struct SubmitPlan {
    /// One step per commit, oldest first
    pub steps: Vec<SubmitStep>,
    /// `(commit id, branch name)` refspecs to push before touching MRs
    pub branches_to_push: Vec<(String, String)>,
    /// Live MRs whose source branch no longer matches any commit in the
    /// stack (e.g. a commit was dropped); left untouched, surfaced so the
    /// caller can warn
    pub orphaned: Vec<MergeRequest>,
}

impl SubmitPlan {
    /// Count create intents
    pub fn count_creates(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, SubmitStep::Create(_)))
            .count()
    }

    /// Count update intents
    pub fn count_updates(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, SubmitStep::Update(_)))
            .count()
    }

    /// Whether the plan changes anything remotely
    pub fn is_noop(&self) -> bool {
        self.steps
            .iter()
            .all(|s| matches!(s, SubmitStep::Noop(_)))
    }
}

/// Map each commit in the stack to a create/update/no-op intent (PURE).
///
/// Commits arrive oldest first; live MRs are matched by source branch. For
/// matched MRs the content setters are applied so only real differences set
/// the dirty bit.
pub fn create_submit_plan(commits: &[Commit], existing: Vec<MergeRequest>) -> SubmitPlan {
    let mut by_source: HashMap<String, MergeRequest> = existing
        .into_iter()
        .map(|mr| (mr.source_branch().to_string(), mr))
        .collect();

    let mut steps = Vec::with_capacity(commits.len());
    let mut branches_to_push = Vec::with_capacity(commits.len());

    for commit in commits {
        branches_to_push.push((commit.id.clone(), commit.source_branch.clone()));

        match by_source.remove(&commit.source_branch) {
            None => steps.push(SubmitStep::Create(MergeRequest::from_commit(commit))),
            Some(mut mr) => {
                mr.set_target_branch(&commit.target_branch);
                mr.set_title(commit.title());
                mr.set_description(commit.description());
                if mr.needs_save() {
                    steps.push(SubmitStep::Update(mr));
                } else {
                    steps.push(SubmitStep::Noop(mr));
                }
            }
        }
    }

    let mut orphaned: Vec<MergeRequest> = by_source.into_values().collect();
    orphaned.sort_by(|a, b| a.source_branch().cmp(b.source_branch()));

    SubmitPlan {
        steps,
        branches_to_push,
        orphaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoteMrFields;

    fn commit(n: u32, message: &str) -> Commit {
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

    fn live_mr(iid: u64, source: &str, target: &str, title: &str, desc: &str) -> MergeRequest {
        MergeRequest::from_remote(RemoteMrFields {
            iid,
            source_branch: source.to_string(),
            target_branch: target.to_string(),
            title: title.to_string(),
            description: desc.to_string(),
            web_url: format!("https://gl/mr/{iid}"),
            mergeable: true,
            sha: Some(format!("sha-{iid}")),
        })
    }

    #[test]
    fn fresh_stack_emits_three_creates_with_chained_targets() {
        // Scenario: three commits based on master, nothing live yet.
        let commits = vec![
            commit(1, "One\n\nbody one"),
            commit(2, "Two"),
            commit(3, "Three"),
        ];
        let plan = create_submit_plan(&commits, Vec::new());

        assert_eq!(plan.count_creates(), 3);
        assert_eq!(plan.count_updates(), 0);
        assert!(plan.orphaned.is_empty());

        let targets: Vec<&str> = plan.steps.iter().map(|s| s.mr().target_branch()).collect();
        assert_eq!(targets, ["master", "feat-1", "feat-2"]);
        let sources: Vec<&str> = plan.steps.iter().map(|s| s.mr().source_branch()).collect();
        assert_eq!(sources, ["feat-1", "feat-2", "feat-3"]);

        assert_eq!(plan.steps[0].mr().title(), "One");
        assert_eq!(plan.steps[0].mr().description(), "body one");
    }

    #[test]
    fn stale_title_yields_exactly_one_update() {
        // Scenario: C2's live MR has an old title; C1 and C3 match.
        let commits = vec![commit(1, "One"), commit(2, "Two"), commit(3, "Three")];
        let existing = vec![
            live_mr(1, "feat-1", "master", "One", ""),
            live_mr(2, "feat-2", "feat-1", "Old two", ""),
            live_mr(3, "feat-3", "feat-2", "Three", ""),
        ];
        let plan = create_submit_plan(&commits, existing);

        assert_eq!(plan.count_creates(), 0);
        assert_eq!(plan.count_updates(), 1);
        match &plan.steps[1] {
            SubmitStep::Update(mr) => {
                assert_eq!(mr.source_branch(), "feat-2");
                assert_eq!(mr.title(), "Two");
                assert!(mr.needs_save());
            }
            other => panic!("expected update for feat-2, got: {other:?}"),
        }
        assert!(matches!(&plan.steps[0], SubmitStep::Noop(_)));
        assert!(matches!(&plan.steps[2], SubmitStep::Noop(_)));
    }

    #[test]
    fn trailing_whitespace_in_live_description_is_not_stale() {
        let commits = vec![commit(1, "One\n\nbody")];
        let existing = vec![live_mr(1, "feat-1", "master", "One", "body\n")];
        let plan = create_submit_plan(&commits, existing);
        assert!(plan.is_noop());
    }

    #[test]
    fn reordered_stack_updates_target_branches() {
        // Commit 2 now comes first: its MR should retarget to master.
        let commits = vec![Commit {
            id: "sha-2".to_string(),
            message: "Two".to_string(),
            source_branch: "feat-2".to_string(),
            target_branch: "master".to_string(),
        }];
        let existing = vec![live_mr(2, "feat-2", "feat-1", "Two", "")];
        let plan = create_submit_plan(&commits, existing);

        assert_eq!(plan.count_updates(), 1);
        assert_eq!(plan.steps[0].mr().target_branch(), "master");
    }

    #[test]
    fn dropped_commit_leaves_orphaned_mr() {
        let commits = vec![commit(1, "One")];
        let existing = vec![
            live_mr(1, "feat-1", "master", "One", ""),
            live_mr(2, "feat-2", "feat-1", "Two", ""),
        ];
        let plan = create_submit_plan(&commits, existing);

        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.orphaned.len(), 1);
        assert_eq!(plan.orphaned[0].source_branch(), "feat-2");
    }

    #[test]
    fn every_commit_branch_is_pushed() {
        let commits = vec![commit(1, "One"), commit(2, "Two")];
        let plan = create_submit_plan(&commits, Vec::new());
        assert_eq!(
            plan.branches_to_push,
            vec![
                ("sha-1".to_string(), "feat-1".to_string()),
                ("sha-2".to_string(), "feat-2".to_string()),
            ]
        );
    }
}
