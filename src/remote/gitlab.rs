//! GitLab merge-request API client

use crate::config::Config;
use crate::error::{Error, Result};
use crate::remote::{RemoteService, RetryPolicy};
use crate::types::{MergeRequest, RemoteCommit, RemoteMrFields};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Header carrying the private token on every request
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size used when listing open MRs
const LIST_PAGE_SIZE: u32 = 50;

/// GitLab service using reqwest
pub struct GitLabClient {
    client: Client,
    token: String,
    mr_url: String,
    remove_source_branch: bool,
}

/// Merge request record as GitLab returns it.
///
/// A fixed schema: required fields fail the decode when missing, unknown
/// fields are ignored.
#[derive(Deserialize)]
struct GitLabMr {
    iid: u64,
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    web_url: String,
    #[serde(default)]
    merge_status: Option<String>,
    #[serde(default)]
    sha: Option<String>,
}

impl From<GitLabMr> for RemoteMrFields {
    fn from(mr: GitLabMr) -> Self {
        Self {
            iid: mr.iid,
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
            title: mr.title,
            description: mr.description.unwrap_or_default(),
            web_url: mr.web_url,
            mergeable: mr.merge_status.as_deref() == Some("can_be_merged"),
            sha: mr.sha,
        }
    }
}

#[derive(Deserialize)]
struct GitLabCommit {
    id: String,
    title: String,
}

#[derive(Serialize)]
struct CreateMrPayload<'a> {
    source_branch: &'a str,
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
    remove_source_branch: bool,
}

#[derive(Serialize)]
struct UpdateMrPayload<'a> {
    target_branch: &'a str,
    title: &'a str,
    description: &'a str,
}

impl GitLabClient {
    /// Create a client for the configured project
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        let mr_url = format!(
            "{}/api/v4/projects/{}/merge_requests",
            config.host,
            urlencoding::encode(&config.project_id),
        );

        Ok(Self {
            client,
            token: config.private_token.clone(),
            mr_url,
            remove_source_branch: config.remove_source_branch,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(TOKEN_HEADER, &self.token)
    }

    fn iid_url(&self, mr: &MergeRequest) -> Result<String> {
        Ok(format!("{}/{}", self.mr_url, mr.require_iid()?))
    }

    /// Turn a non-success response into a fatal API error carrying the
    /// server's body and the branch pair involved.
    async fn ensure_success(
        response: Response,
        context: &'static str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            context,
            status: status.as_u16(),
            body,
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
        })
    }
}

#[async_trait]
impl RemoteService for GitLabClient {
    async fn create(&self, mr: &mut MergeRequest) -> Result<()> {
        debug!(source = mr.source_branch(), target = mr.target_branch(), "creating MR");
        let payload = CreateMrPayload {
            source_branch: mr.source_branch(),
            target_branch: mr.target_branch(),
            title: mr.title(),
            description: mr.description(),
            remove_source_branch: self.remove_source_branch,
        };

        let response = self
            .request(Method::POST, &self.mr_url)
            .json(&payload)
            .send()
            .await?;
        let created: GitLabMr = Self::ensure_success(
            response,
            "creating merge request",
            mr.source_branch(),
            mr.target_branch(),
        )
        .await?
        .json()
        .await?;

        mr.record_created(created.iid, created.web_url);
        debug!(iid = mr.iid(), "created MR");
        Ok(())
    }

    async fn update(&self, mr: &mut MergeRequest) -> Result<()> {
        debug!(iid = mr.iid(), source = mr.source_branch(), "updating MR");
        let url = self.iid_url(mr)?;
        let payload = UpdateMrPayload {
            target_branch: mr.target_branch(),
            title: mr.title(),
            description: mr.description(),
        };

        let response = self
            .request(Method::PUT, &url)
            .json(&payload)
            .send()
            .await?;
        let updated: GitLabMr = Self::ensure_success(
            response,
            "updating merge request",
            mr.source_branch(),
            mr.target_branch(),
        )
        .await?
        .json()
        .await?;

        // The remote may reassign display fields on update.
        mr.record_created(updated.iid, updated.web_url);
        Ok(())
    }

    async fn rebase(&self, mr: &MergeRequest) -> Result<()> {
        debug!(iid = mr.iid(), "requesting rebase");
        let url = format!("{}/rebase", self.iid_url(mr)?);
        let response = self.request(Method::PUT, &url).send().await?;
        Self::ensure_success(
            response,
            "rebasing merge request",
            mr.source_branch(),
            mr.target_branch(),
        )
        .await?;
        Ok(())
    }

    async fn merge(&self, mr: &MergeRequest, retry: &RetryPolicy) -> Result<()> {
        let url = format!("{}/merge", self.iid_url(mr)?);
        for attempt in 1..=retry.max_attempts {
            let response = self.request(Method::PUT, &url).send().await?;
            if response.status().is_success() {
                debug!(iid = mr.iid(), attempt, "merged MR");
                return Ok(());
            }
            // "Not yet mergeable" shows up as a non-success status; every
            // non-success is treated as transient here.
            debug!(
                iid = mr.iid(),
                attempt,
                status = response.status().as_u16(),
                "merge not accepted yet"
            );
            if attempt < retry.max_attempts {
                tokio::time::sleep(retry.interval).await;
            }
        }
        Err(Error::Timeout {
            waiting_for: format!("{} to merge", mr.source_branch()),
            attempts: retry.max_attempts,
        })
    }

    async fn delete(&self, mr: &MergeRequest) -> Result<()> {
        debug!(iid = mr.iid(), "deleting MR");
        let url = self.iid_url(mr)?;
        let response = self.request(Method::DELETE, &url).send().await?;
        Self::ensure_success(
            response,
            "deleting merge request",
            mr.source_branch(),
            mr.target_branch(),
        )
        .await?;
        Ok(())
    }

    async fn refresh(&self, mr: &mut MergeRequest) -> Result<()> {
        let url = self.iid_url(mr)?;
        let response = self.request(Method::GET, &url).send().await?;
        let fetched: GitLabMr = Self::ensure_success(
            response,
            "fetching merge request",
            mr.source_branch(),
            mr.target_branch(),
        )
        .await?
        .json()
        .await?;

        mr.apply_remote(fetched.into());
        Ok(())
    }

    async fn get_commits(&self, mr: &MergeRequest) -> Result<Vec<RemoteCommit>> {
        let url = format!("{}/commits", self.iid_url(mr)?);
        let response = self.request(Method::GET, &url).send().await?;
        let commits: Vec<GitLabCommit> = Self::ensure_success(
            response,
            "listing merge request commits",
            mr.source_branch(),
            mr.target_branch(),
        )
        .await?
        .json()
        .await?;

        Ok(commits
            .into_iter()
            .map(|c| RemoteCommit {
                id: c.id,
                title: c.title,
            })
            .collect())
    }

    async fn list_open(&self, prefix: &str) -> Result<Vec<MergeRequest>> {
        let mut results = Vec::new();
        let mut page: u32 = 1;
        loop {
            let response = self
                .request(Method::GET, &self.mr_url)
                .query(&[
                    ("state", "opened"),
                    ("scope", "created_by_me"),
                    ("page", &page.to_string()),
                    ("per_page", &LIST_PAGE_SIZE.to_string()),
                ])
                .send()
                .await?;
            let mrs: Vec<GitLabMr> = Self::ensure_success(
                response,
                "listing open merge requests",
                prefix,
                "*",
            )
            .await?
            .json()
            .await?;

            if mrs.is_empty() {
                break;
            }
            results.extend(
                mrs.into_iter()
                    .filter(|mr| mr.source_branch.starts_with(prefix))
                    .map(|mr| MergeRequest::from_remote(mr.into())),
            );
            page += 1;
        }
        debug!(prefix, count = results.len(), "listed open MRs");
        Ok(results)
    }
}
