//! List command - show the stack's open MRs in chain order

use crate::cli::context::CommandContext;
use crate::cli::style::{arrow, Stylize};
use anstream::println;
use stacklab::chain::build_chain;
use stacklab::error::Result;
use std::path::Path;

/// Options for the list command
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Also show the remote tip sha and the MR's commits
    pub verbose: bool,
}

/// Run the list command
pub async fn run_list(path: &Path, remote: Option<&str>, options: ListOptions) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;

    let existing = ctx.remote.list_open(&ctx.branch_prefix()).await?;
    if existing.is_empty() {
        println!("{}", "No open MRs for this stack.".muted());
        return Ok(());
    }

    let chain = build_chain(existing)?;

    println!(
        "{} open MR(s) on {}:",
        chain.len(),
        ctx.local_branch.accent()
    );
    println!();
    for mr in &chain {
        let iid = mr.iid().map_or_else(|| "?".to_string(), |i| i.to_string());
        println!(
            "  !{} {} {} {}: {}",
            iid.accent(),
            mr.source_branch().accent(),
            arrow(),
            mr.target_branch().accent(),
            mr.title()
        );
        if let Some(url) = mr.web_url() {
            println!("      {}", url.muted());
        }

        if options.verbose {
            let mergeable = if mr.mergeable() { "yes" } else { "no" };
            println!(
                "      mergeable: {mergeable}  tip: {}",
                mr.sha().unwrap_or("unknown").muted()
            );
            for commit in ctx.remote.get_commits(mr).await? {
                let short = commit.id.get(..8).unwrap_or(&commit.id);
                println!("      {} {}", short.muted(), commit.title);
            }
        }
    }

    Ok(())
}
