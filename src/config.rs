//! Configuration loading.
//!
//! All settings live in `.stacklab.toml` at the repository root and are read
//! once at startup; the resulting [`Config`] is immutable and passed by
//! reference into every component. The private token may instead come from
//! the `GITLAB_PRIVATE_TOKEN` environment variable, which takes precedence
//! over the file.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use url::Url;

/// Config filename looked up at the repository root
pub const CONFIG_FILE: &str = ".stacklab.toml";

/// Environment variable overriding the private token from the config file
pub const TOKEN_ENV_VAR: &str = "GITLAB_PRIVATE_TOKEN";

/// Immutable run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GitLab host, e.g. `https://gitlab.example.com`
    pub host: String,
    /// Project id or URL-encoded project path
    pub project_id: String,
    /// Private token attached to every API request
    pub private_token: String,
    /// Base branch the chain root targets
    pub target_branch: String,
    /// Ask the remote to delete source branches when MRs merge
    pub remove_source_branch: bool,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    host: String,
    project_id: String,
    private_token: Option<String>,
    target_branch: Option<String>,
    remove_source_branch: Option<bool>,
}

impl Config {
    /// Load configuration from `.stacklab.toml` under `repo_root`.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = repo_root.join(CONFIG_FILE);
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&content, std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Parse config content, with an optional token from the environment.
    pub fn parse(content: &str, env_token: Option<String>) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid {CONFIG_FILE}: {e}")))?;

        let host = file.host.trim_end_matches('/').to_string();
        Url::parse(&host).map_err(|e| Error::Config(format!("invalid host {host}: {e}")))?;

        let private_token = env_token.or(file.private_token).ok_or_else(|| {
            Error::Config(format!(
                "no private token: set {TOKEN_ENV_VAR} or private_token in {CONFIG_FILE}"
            ))
        })?;

        Ok(Self {
            host,
            project_id: file.project_id,
            private_token,
            target_branch: file.target_branch.unwrap_or_else(|| "master".to_string()),
            remove_source_branch: file.remove_source_branch.unwrap_or(false),
        })
    }
}
