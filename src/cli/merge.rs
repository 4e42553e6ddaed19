//! Merge command - land the MR chain in dependency order

use crate::cli::context::CommandContext;
use crate::cli::style::{arrow, check, spinner_style, Stylize};
use anstream::println;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use stacklab::chain::build_chain;
use stacklab::error::{Error, Result};
use stacklab::merge::{merge_chain, MergeOutcome, MergePolicies};
use stacklab::types::{Commit, MergeRequest};
use std::path::Path;
use std::time::Duration;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Dry run - show what would be merged without making changes
    pub dry_run: bool,
    /// Preview the chain and prompt for confirmation before executing
    pub confirm: bool,
}

/// Run the merge command
pub async fn run_merge(path: &Path, remote: Option<&str>, options: MergeOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;

    // =========================================================================
    // Phase 1: GATHER - Collect all data upfront
    // =========================================================================

    let commits = ctx.commit_stack()?;
    let existing = ctx.remote.list_open(&ctx.branch_prefix()).await?;

    if existing.is_empty() {
        println!("{}", "No open MRs for this stack.".muted());
        return Ok(());
    }

    // =========================================================================
    // Phase 2: PLAN - Order the chain root to leaf
    // =========================================================================

    let chain = build_chain(existing)?;

    // Every link must still correspond to a local commit; the commit supplies
    // the sha the remote has to reach before the link may merge.
    for mr in &chain {
        if !commits
            .iter()
            .any(|c| c.source_branch == mr.source_branch())
        {
            return Err(Error::MalformedChain(format!(
                "{} has an open MR but no matching local commit; run 'stacklab submit' first",
                mr.source_branch()
            )));
        }
    }

    if options.dry_run {
        report_merge_dry_run(&chain);
        return Ok(());
    }

    if options.confirm {
        report_merge_dry_run(&chain);
        if !Confirm::new()
            .with_prompt("Proceed with merge?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    // =========================================================================
    // Phase 3: EXECUTE - Effectful operations
    // =========================================================================

    println!(
        "{} {}",
        "Merging".emphasis(),
        format!("{} MR(s)...", chain.len()).accent()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message("Waiting on the remote...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let outcome = merge_chain(chain, &commits, ctx.remote.as_ref(), &MergePolicies::default())
        .await?;

    spinner.finish_and_clear();
    print_merge_summary(&outcome, &commits);

    match outcome.failed {
        None => Ok(()),
        Some(branch) => Err(Error::MergeAborted {
            branch,
            message: outcome.error_message.unwrap_or_default(),
        }),
    }
}

/// Print the merge summary
fn print_merge_summary(outcome: &MergeOutcome, commits: &[Commit]) {
    println!();
    if outcome.is_success() {
        println!("{} Merge complete!", check().success());
    } else {
        println!("{} Merge partially complete", "warning:".warn());
    }

    for branch in &outcome.merged {
        let title = commits
            .iter()
            .find(|c| &c.source_branch == branch)
            .map(Commit::title)
            .unwrap_or_default();
        println!("   Merged {}: {title}", branch.accent());
    }

    if let Some(ref failed) = outcome.failed {
        println!("   {} {}", "Failed:".warn(), failed.warn());
        if let Some(ref msg) = outcome.error_message {
            println!("          {}", msg.muted());
        }
    }
}

/// Report the merge order (dry run)
fn report_merge_dry_run(chain: &[MergeRequest]) {
    println!("{}:", "Merge order".emphasis());
    println!();
    for mr in chain {
        println!(
            "  {} {} {}: {}",
            mr.source_branch().accent(),
            arrow(),
            mr.target_branch().accent(),
            mr.title()
        );
    }
    println!();
}
