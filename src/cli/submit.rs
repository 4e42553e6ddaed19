//! Submit command - push branches and reconcile MRs with the commit stack

use crate::cli::context::CommandContext;
use crate::cli::style::{check, spinner_style, Stylize};
use anstream::println;
use indicatif::ProgressBar;
use stacklab::error::Result;
use stacklab::submit::{create_submit_plan, execute_submit, SubmitPlan, SubmitStep};
use std::path::Path;
use std::time::Duration;

/// Options for the submit command
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Dry run - show what would be done without making changes
    pub dry_run: bool,
}

/// Run the submit command
pub async fn run_submit(path: &Path, remote: Option<&str>, options: SubmitOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;

    // =========================================================================
    // Phase 1: GATHER - Collect all data upfront
    // =========================================================================

    let commits = ctx.commit_stack()?;
    if commits.is_empty() {
        println!(
            "{}",
            format!(
                "Nothing to submit: {} has no commits beyond {}.",
                ctx.local_branch, ctx.config.target_branch
            )
            .muted()
        );
        return Ok(());
    }

    let existing = ctx.remote.list_open(&ctx.branch_prefix()).await?;

    // =========================================================================
    // Phase 2: PLAN - Pure function, easily testable
    // =========================================================================

    let plan = create_submit_plan(&commits, existing);

    if options.dry_run {
        report_submit_dry_run(&plan);
        return Ok(());
    }

    // =========================================================================
    // Phase 3: EXECUTE - Effectful operations
    // =========================================================================

    // Branches go up first so create/update requests refer to refs the
    // remote already has.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!(
        "Pushing {} branch(es)...",
        plan.branches_to_push.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    ctx.git.push_branches(&plan.branches_to_push)?;

    spinner.finish_with_message(format!(
        "{} Pushed {} branch(es)",
        check(),
        plan.branches_to_push.len()
    ));

    warn_orphaned(&plan);

    let outcome = execute_submit(plan, ctx.remote.as_ref()).await?;

    println!();
    for mr in &outcome.created {
        println!(
            "{} Created {}: {}",
            check(),
            mr.source_branch().accent(),
            mr.web_url().unwrap_or_default().muted()
        );
    }
    for mr in &outcome.updated {
        println!(
            "{} Updated {}: {}",
            check(),
            mr.source_branch().accent(),
            mr.web_url().unwrap_or_default().muted()
        );
    }
    if !outcome.unchanged.is_empty() {
        println!(
            "{}",
            format!("{} MR(s) already up to date", outcome.unchanged.len()).muted()
        );
    }

    Ok(())
}

/// Report what would be done (dry run)
fn report_submit_dry_run(plan: &SubmitPlan) {
    println!("{}:", "Submit plan".emphasis());
    println!();

    for step in &plan.steps {
        match step {
            SubmitStep::Create(_) => println!("  {} {step}", "+".success()),
            SubmitStep::Update(_) => println!("  {} {step}", "~".warn()),
            SubmitStep::Noop(_) => println!("  {}", format!("  {step}").muted()),
        }
    }

    warn_orphaned(plan);

    println!();
    if plan.is_noop() {
        println!("{}", "Everything is up to date.".muted());
    } else {
        println!(
            "{}",
            format!(
                "{} create(s), {} update(s). Run without --dry-run to execute.",
                plan.count_creates(),
                plan.count_updates()
            )
            .muted()
        );
    }
}

/// Warn about live MRs whose commit disappeared from the stack
fn warn_orphaned(plan: &SubmitPlan) {
    for mr in &plan.orphaned {
        println!(
            "{} {} has an open MR but no matching commit; run 'stacklab abandon' to close it",
            "warning:".warn(),
            mr.source_branch().accent()
        );
    }
}
