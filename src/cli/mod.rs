//! Command-line interface: argument parsing and command dispatch.

mod abandon;
mod context;
mod list;
mod merge;
mod style;
mod submit;

use abandon::AbandonOptions;
use clap::{Parser, Subcommand};
use list::ListOptions;
use merge::MergeOptions;
use stacklab::error::Result;
use std::path::PathBuf;
use submit::SubmitOptions;

/// Stacked merge requests for GitLab
#[derive(Parser)]
#[command(name = "stacklab", version, about)]
pub struct Cli {
    /// Repository path (defaults to the current directory)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    path: PathBuf,

    /// Git remote to push to and derive MRs from
    #[arg(long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Push branches and create/update one MR per commit in the stack
    Submit {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },
    /// Merge the MR chain in dependency order
    Merge {
        /// Show the merge order without making changes
        #[arg(long)]
        dry_run: bool,
        /// Preview the chain and prompt before merging
        #[arg(long)]
        confirm: bool,
    },
    /// Show the stack's open MRs in chain order
    List {
        /// Also show mergeability, remote tips, and MR commits
        #[arg(short, long)]
        verbose: bool,
    },
    /// Close the stack's open MRs
    Abandon {
        /// Also delete the source branches on the remote
        #[arg(long)]
        delete_branches: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Dispatch the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let path = cli.path.as_path();
    let remote = cli.remote.as_deref();

    match cli.command {
        Commands::Submit { dry_run } => {
            submit::run_submit(path, remote, SubmitOptions { dry_run }).await
        }
        Commands::Merge { dry_run, confirm } => {
            merge::run_merge(path, remote, MergeOptions { dry_run, confirm }).await
        }
        Commands::List { verbose } => list::run_list(path, remote, ListOptions { verbose }).await,
        Commands::Abandon {
            delete_branches,
            yes,
        } => {
            abandon::run_abandon(
                path,
                remote,
                AbandonOptions {
                    delete_branches,
                    yes,
                },
            )
            .await
        }
    }
}
