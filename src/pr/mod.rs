pub mod diff;
pub mod types;

pub use types::{Chunk, ParsedFile, PullRequestContext, RepoRef};
#[cfg(test)]
pub use types::{ChangeKind, ChangeLine};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GitHubConfig;
use crate::review::PostableComment;

const USER_AGENT: &str = "gpt-pr-reviewer";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.diff";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Failed to parse diff: {0}")]
    DiffParse(String),

    #[error("GitHub token not found in configuration or environment")]
    MissingToken,
}

/// The parts of GitHub's PR-detail response the reviewer needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestDetails {
    pub title: String,
    /// `null` for PRs opened without a description
    pub body: Option<String>,
}

/// The hosting-API calls the reviewer consumes.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// GET /repos/{owner}/{repo}/pulls/{number}
    async fn pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequestDetails, PrError>;

    /// The full PR diff (diff media type).
    async fn pull_request_diff(&self, repo: &RepoRef, number: u64) -> Result<String, PrError>;

    /// The diff between two commits (diff media type).
    async fn compare_diff(&self, repo: &RepoRef, base: &str, head: &str) -> Result<String, PrError>;

    /// Submit all comments as a single comment-only review.
    async fn create_review(
        &self,
        repo: &RepoRef,
        number: u64,
        comments: &[PostableComment],
    ) -> Result<(), PrError>;
}

/// Build the run's PR context from the event coordinates and the PR-detail response.
pub async fn fetch_context(
    api: &dyn HostingApi,
    repo: &RepoRef,
    number: u64,
) -> Result<PullRequestContext, PrError> {
    let details = api.pull_request(repo, number).await?;
    debug!(title = %details.title, has_description = details.body.is_some(), "received PR metadata");

    Ok(PullRequestContext {
        owner: repo.owner.clone(),
        repo: repo.repo.clone(),
        pull_number: number,
        title: details.title,
        description: details.body.unwrap_or_default(),
    })
}

/// GitHub REST API client.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct CreateReviewRequest<'a> {
    event: &'static str,
    comments: &'a [PostableComment],
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, PrError> {
        let token = config.token.clone().ok_or(PrError::MissingToken)?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn pulls_endpoint(&self, repo: &RepoRef, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, repo.owner, repo.repo, number
        )
    }

    fn request(&self, method: reqwest::Method, url: &str, accept: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", accept)
            .bearer_auth(&self.token)
    }

    async fn get_diff(&self, url: &str) -> Result<String, PrError> {
        let diff_text = self
            .request(reqwest::Method::GET, url, DIFF_MEDIA_TYPE)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(diff_bytes = diff_text.len(), "received diff");
        Ok(diff_text)
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    #[instrument(skip(self, repo), fields(owner = %repo.owner, repo = %repo.repo))]
    async fn pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequestDetails, PrError> {
        debug!("fetching PR metadata from GitHub API");
        let details = self
            .request(reqwest::Method::GET, &self.pulls_endpoint(repo, number), JSON_MEDIA_TYPE)
            .send()
            .await?
            .error_for_status()?
            .json::<PullRequestDetails>()
            .await?;
        Ok(details)
    }

    #[instrument(skip(self, repo), fields(owner = %repo.owner, repo = %repo.repo))]
    async fn pull_request_diff(&self, repo: &RepoRef, number: u64) -> Result<String, PrError> {
        debug!("fetching PR diff from GitHub API");
        self.get_diff(&self.pulls_endpoint(repo, number)).await
    }

    #[instrument(skip(self, repo), fields(owner = %repo.owner, repo = %repo.repo))]
    async fn compare_diff(&self, repo: &RepoRef, base: &str, head: &str) -> Result<String, PrError> {
        debug!("fetching commit comparison from GitHub API");
        let url = format!(
            "{}/repos/{}/{}/compare/{}...{}",
            self.api_url, repo.owner, repo.repo, base, head
        );
        self.get_diff(&url).await
    }

    #[instrument(skip(self, repo, comments), fields(owner = %repo.owner, repo = %repo.repo, comments = comments.len()))]
    async fn create_review(
        &self,
        repo: &RepoRef,
        number: u64,
        comments: &[PostableComment],
    ) -> Result<(), PrError> {
        let url = format!("{}/reviews", self.pulls_endpoint(repo, number));
        debug!("creating review");
        self.request(reqwest::Method::POST, &url, JSON_MEDIA_TYPE)
            .json(&CreateReviewRequest {
                event: "COMMENT",
                comments,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
