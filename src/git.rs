//! Local repository access: reading the commit stack and pushing branches.
//!
//! The core never touches the working copy beyond this boundary; everything
//! durable lives on the remote.

use crate::error::{Error, Result};
use crate::types::Commit;
use git2::{Cred, CredentialType, PushOptions, RemoteCallbacks, Repository, Sort};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle on the local repository and the remote branches are pushed to
pub struct GitRepo {
    repo: Repository,
    remote_name: String,
}

impl GitRepo {
    /// Open the repository containing `path`
    pub fn open(path: &Path, remote_name: &str) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self {
            repo,
            remote_name: remote_name.to_string(),
        })
    }

    /// Repository working-copy root
    pub fn root(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Internal("repository has no working copy".to_string()))
    }

    /// Name of the currently checked-out branch
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        head.shorthand()
            .map(ToString::to_string)
            .ok_or_else(|| Error::Internal("HEAD is not on a branch".to_string()))
    }

    /// Read the commit stack: everything on HEAD that the remote base branch
    /// does not have, oldest first.
    ///
    /// Source branches are derived by appending the stack position to the
    /// local branch name; each commit targets its predecessor's source
    /// branch, the first one targets the base branch.
    pub fn commit_stack(&self, base_branch: &str, local_branch: &str) -> Result<Vec<Commit>> {
        let mut walk = self.repo.revwalk()?;
        walk.push_head()?;
        walk.hide_ref(&format!(
            "refs/remotes/{}/{base_branch}",
            self.remote_name
        ))?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

        let mut commits = Vec::new();
        let mut target = base_branch.to_string();
        for (idx, oid) in walk.enumerate() {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            let source = format!("{local_branch}-{}", idx + 1);
            commits.push(Commit {
                id: oid.to_string(),
                message: commit.message().unwrap_or_default().to_string(),
                source_branch: source.clone(),
                target_branch: target,
            });
            target = source;
        }
        debug!(count = commits.len(), base_branch, "read commit stack");
        Ok(commits)
    }

    /// Force-push each commit to its source branch on the remote
    pub fn push_branches(&self, refspecs: &[(String, String)]) -> Result<()> {
        if refspecs.is_empty() {
            return Ok(());
        }
        let specs: Vec<String> = refspecs
            .iter()
            .map(|(commit_id, branch)| format!("+{commit_id}:refs/heads/{branch}"))
            .collect();
        self.push(&specs)
    }

    /// Delete a branch on the remote by pushing an empty refspec source
    pub fn delete_remote_branch(&self, branch: &str) -> Result<()> {
        self.push(&[format!(":refs/heads/{branch}")])
    }

    fn push(&self, refspecs: &[String]) -> Result<()> {
        debug!(remote = %self.remote_name, ?refspecs, "pushing");
        let mut remote = self.repo.find_remote(&self.remote_name)?;
        let mut options = PushOptions::new();
        options.remote_callbacks(self.callbacks()?);
        let specs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        remote.push(&specs, Some(&mut options))?;
        Ok(())
    }

    fn callbacks(&self) -> Result<RemoteCallbacks<'_>> {
        let config = self.repo.config()?;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username, allowed| {
            if allowed.contains(CredentialType::SSH_KEY) {
                Cred::ssh_key_from_agent(username.unwrap_or("git"))
            } else if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                Cred::credential_helper(&config, url, username)
            } else {
                Cred::default()
            }
        });
        callbacks.push_update_reference(|refname, status| match status {
            None => Ok(()),
            Some(message) => Err(git2::Error::from_str(&format!(
                "push rejected for {refname}: {message}"
            ))),
        });
        Ok(callbacks)
    }
}
