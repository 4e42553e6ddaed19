//! Shared command context for CLI commands
//!
//! Extracts the common setup shared by submit, merge, list, and abandon:
//! opening the repository, loading configuration, and constructing the
//! remote client.

use stacklab::config::Config;
use stacklab::error::Result;
use stacklab::git::GitRepo;
use stacklab::remote::{GitLabClient, RemoteService};
use stacklab::types::Commit;
use std::path::Path;

/// Default remote name when `--remote` is not given
const DEFAULT_REMOTE: &str = "origin";

/// Shared context for CLI commands that interact with the remote
pub struct CommandContext {
    /// The local repository
    pub git: GitRepo,
    /// Immutable run configuration
    pub config: Config,
    /// Remote MR service
    pub remote: Box<dyn RemoteService>,
    /// Name of the currently checked-out branch
    pub local_branch: String,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// Opens the repository containing `path`, loads `.stacklab.toml` from
    /// its root, reads the current branch, and builds the GitLab client.
    pub fn new(path: &Path, remote: Option<&str>) -> Result<Self> {
        let git = GitRepo::open(path, remote.unwrap_or(DEFAULT_REMOTE))?;
        let config = Config::load(&git.root()?)?;
        let local_branch = git.current_branch()?;
        let remote = Box::new(GitLabClient::new(&config)?);

        Ok(Self {
            git,
            config,
            remote,
            local_branch,
        })
    }

    /// Source-branch prefix identifying this stack's MRs on the remote
    pub fn branch_prefix(&self) -> String {
        format!("{}-", self.local_branch)
    }

    /// Read the local commit stack, oldest first
    pub fn commit_stack(&self) -> Result<Vec<Commit>> {
        self.git
            .commit_stack(&self.config.target_branch, &self.local_branch)
    }
}
