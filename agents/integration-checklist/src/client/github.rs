//! GitHub REST client
//!
//! Implements [`RemoteFileFetcher`] with the contents API and
//! [`ReleaseTagSource`] with the tags API. No retries: any failure is
//! reported to the caller as [`ChecklistError::UpstreamFetchFailed`].

use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::{ReleaseTagSource, RemoteFileFetcher};
use crate::error::{ChecklistError, Result};

const TAGS_PER_PAGE: usize = 100;
const MAX_TAG_PAGES: u32 = 50;

/// Configuration for the GitHub client
#[derive(Clone)]
pub struct GitHubClientConfig {
    /// Base URL of the REST API
    pub api_url: String,

    /// Token sent as a bearer credential
    pub token: Option<String>,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    pub user_agent: String,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            timeout_ms: 10_000,
            user_agent: format!("integration-checklist/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl fmt::Debug for GitHubClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Response body of `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    name: String,
}

/// HTTP client for the GitHub REST API
pub struct GitHubClient {
    client: Client,
    config: GitHubClientConfig,
}

impl GitHubClient {
    /// Create a client for the given API URL and optional token
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let config = GitHubClientConfig {
            api_url: api_url.into(),
            token,
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Create a client with custom configuration
    pub fn with_config(config: GitHubClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ChecklistError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }

    pub fn has_token(&self) -> bool {
        self.config.token.is_some()
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            owner,
            repo
        )
    }
}

#[async_trait]
impl RemoteFileFetcher for GitHubClient {
    async fn fetch_file_at_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        relative_path: &str,
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/contents/{}",
            self.repo_url(owner, repo),
            relative_path.trim_start_matches('/')
        );

        tracing::debug!(%url, branch, "Fetching file from remote branch");

        let response = self.get(&url).query(&[("ref", branch)]).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(branch, relative_path, "File not present on remote branch");
            return Ok(None);
        }
        check_status(status, "file contents")?;

        let body: ContentResponse = response.json().await.map_err(|e| {
            ChecklistError::upstream(format!("Failed to parse contents response: {}", e))
        })?;

        decode_content(body).map(Some)
    }
}

#[async_trait]
impl ReleaseTagSource for GitHubClient {
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let url = format!("{}/tags", self.repo_url(owner, repo));
        let mut tags = Vec::new();

        for page in 1..=MAX_TAG_PAGES {
            tracing::debug!(%url, page, "Listing release tags");

            let response = self
                .get(&url)
                .query(&[("per_page", TAGS_PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await?;
            check_status(response.status(), "tags")?;

            let batch: Vec<TagResponse> = response.json().await.map_err(|e| {
                ChecklistError::upstream(format!("Failed to parse tags response: {}", e))
            })?;
            let batch_len = batch.len();
            tags.extend(batch.into_iter().map(|t| t.name));

            if batch_len < TAGS_PER_PAGE {
                break;
            }
        }

        Ok(tags)
    }
}

fn check_status(status: StatusCode, what: &str) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ChecklistError::upstream(format!(
            "Authentication failed while fetching {}: {}",
            what, status
        )))
    } else if status.is_server_error() {
        Err(ChecklistError::upstream(format!(
            "Server error while fetching {}: {}",
            what, status
        )))
    } else {
        Err(ChecklistError::upstream(format!(
            "Unexpected status while fetching {}: {}",
            what, status
        )))
    }
}

/// The contents API wraps base64 output at 60 columns
fn decode_content(body: ContentResponse) -> Result<String> {
    let content = body.content.unwrap_or_default();

    match body.encoding.as_deref() {
        Some("base64") => {
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| ChecklistError::upstream(format!("Invalid base64 content: {}", e)))?;
            String::from_utf8(bytes)
                .map_err(|e| ChecklistError::upstream(format!("File is not UTF-8 text: {}", e)))
        }
        None | Some("utf-8") => Ok(content),
        Some(other) => Err(ChecklistError::upstream(format!(
            "Unsupported content encoding: {}",
            other
        ))),
    }
}

/// Builder for GitHubClient
pub struct GitHubClientBuilder {
    config: GitHubClientConfig,
}

impl GitHubClientBuilder {
    pub fn new() -> Self {
        Self {
            config: GitHubClientConfig::default(),
        }
    }

    /// Set the API base URL
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: Option<String>) -> Self {
        self.config.token = token;
        self
    }

    /// Set the request timeout
    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.config.timeout_ms = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GitHubClient> {
        GitHubClient::with_config(self.config)
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
