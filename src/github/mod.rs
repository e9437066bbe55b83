//! GitHub hosting API client
//!
//! Two calls are needed to publish a release: reading the latest release of
//! the plugin repository (tag, notes and asset download URLs) and opening the
//! pull request from the fork's release branch into the upstream registry.
//! Both go through the [`ReleaseHost`] trait so the pipeline can run against
//! a static fake in tests.

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tracing::{debug, info};

use crate::constants::{GITHUB_API_URL, GITHUB_API_VERSION, HTTP_REQUEST_TIMEOUT};
use crate::core::ReleaseError;
use crate::git::extract_owner_and_repo;
use crate::models::Release;

/// A GitHub repository identified as `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Account or organization owning the repository
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepositoryRef {
    /// Creates a reference from its parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses a `https://github.com/<owner>/<repo>.git` clone URL.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::InvalidRepositoryUrl`] for any other URL shape.
    pub fn from_clone_url(url: &str) -> Result<Self> {
        Ok(extract_owner_and_repo(url)?.parse()?)
    }
}

impl FromStr for RepositoryRef {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(ReleaseError::ConfigError {
                message: format!("GITHUB_REPOSITORY must have the form owner/repo, got [{s}]"),
            }),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Body of a pull request creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    /// Title, the release commit message
    pub title: String,
    /// Source branch as `<fork owner>:<branch>`
    pub head: String,
    /// Target branch in the upstream repository
    pub base: String,
    /// Description, the release changelog
    pub body: String,
}

/// Source-control hosting operations used by the release pipeline.
pub trait ReleaseHost: Send + Sync {
    /// Fetches the latest published release of `repository`.
    fn latest_release(
        &self,
        repository: &RepositoryRef,
    ) -> impl Future<Output = Result<Release>> + Send;

    /// Opens `request` against `repository` and returns the pull request URL.
    fn open_pull_request(
        &self,
        repository: &RepositoryRef,
        request: &PullRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Deserialize)]
struct CreatedPullRequest {
    html_url: String,
}

/// [`ReleaseHost`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GithubClient {
    /// Creates a client for `api.github.com` authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(GITHUB_API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_url: GITHUB_API_URL.to_string(),
            token: token.into(),
        })
    }

    /// Points the client at another API root, e.g. a GitHub Enterprise server.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    fn latest_release_request(&self, repository: &RepositoryRef) -> reqwest::RequestBuilder {
        let url = format!("{}/repos/{}/releases/latest", self.api_url, repository);
        self.http.get(url).bearer_auth(&self.token)
    }

    fn pull_request_request(
        &self,
        repository: &RepositoryRef,
        request: &PullRequest,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}/repos/{}/pulls", self.api_url, repository);
        self.http.post(url).bearer_auth(&self.token).json(request)
    }
}

impl ReleaseHost for GithubClient {
    async fn latest_release(&self, repository: &RepositoryRef) -> Result<Release> {
        let operation = format!("fetch latest release of {repository}");
        debug!("Requesting latest release of {}", repository);

        let response = self
            .latest_release_request(repository)
            .send()
            .await
            .with_context(|| format!("Failed to {operation}"))?;
        let response = check_status(response, &operation).await?;

        let release: Release = response
            .json()
            .await
            .with_context(|| format!("Failed to decode latest release of {repository}"))?;
        info!(
            "Latest release of {} is {} with {} assets",
            repository,
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }

    async fn open_pull_request(
        &self,
        repository: &RepositoryRef,
        request: &PullRequest,
    ) -> Result<String> {
        let operation = format!("open pull request {} -> {}:{}", request.head, repository, request.base);
        debug!("Creating pull request \"{}\" on {}", request.title, repository);

        let response = self
            .pull_request_request(repository, request)
            .send()
            .await
            .with_context(|| format!("Failed to {operation}"))?;
        let response = check_status(response, &operation).await?;

        let created: CreatedPullRequest =
            response.json().await.context("Failed to decode pull request response")?;
        Ok(created.html_url)
    }
}

async fn check_status(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ReleaseError::GithubApiError {
        operation: operation.to_string(),
        status: status.as_u16(),
        message: api_error_message(&body),
    }
    .into())
}

/// GitHub reports errors as `{"message": "..."}`; fall back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
