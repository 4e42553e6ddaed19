//! Abandon command - close the stack's open MRs

use crate::cli::context::CommandContext;
use crate::cli::style::{check, Stylize};
use anstream::println;
use dialoguer::Confirm;
use stacklab::error::{Error, Result};
use std::path::Path;

/// Options for the abandon command
#[derive(Debug, Clone, Default)]
pub struct AbandonOptions {
    /// Also delete the source branches on the remote
    pub delete_branches: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// Run the abandon command
pub async fn run_abandon(
    path: &Path,
    remote: Option<&str>,
    options: AbandonOptions,
) -> Result<()> {
    let ctx = CommandContext::new(path, remote)?;

    let existing = ctx.remote.list_open(&ctx.branch_prefix()).await?;
    if existing.is_empty() {
        println!("{}", "No open MRs for this stack.".muted());
        return Ok(());
    }

    println!("{}:", "Will delete".emphasis());
    for mr in &existing {
        println!("  {}: {}", mr.source_branch().accent(), mr.title());
    }
    println!();

    if !options.yes
        && !Confirm::new()
            .with_prompt(format!("Delete {} MR(s)?", existing.len()))
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("failed to read confirmation: {e}")))?
    {
        println!("{}", "Aborted".muted());
        return Ok(());
    }

    for mr in &existing {
        ctx.remote.delete(mr).await?;
        if options.delete_branches {
            ctx.git.delete_remote_branch(mr.source_branch())?;
        }
        println!("{} Deleted {}", check(), mr.source_branch().accent());
    }

    Ok(())
}
