//! GitHub REST API client.
//!
//! Requests go through a shared `reqwest::Client`. Transient failures (HTTP
//! 429/500/502/503/504, connection errors and timeouts) are retried with
//! exponential backoff via `tokio-retry`; everything else fails immediately.
//! Nothing in this module returns a transport error to its caller: the
//! [`Upstream`] implementation folds failures into [`Fetch`].

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use super::types::{ContentEntry, RepoInfo, TreeEntry, TreeResponse, UpstreamRelease};
use super::{Fetch, Upstream};
use crate::constants::{
    API_TIMEOUT, DEFAULT_API_BASE, DEFAULT_RAW_BASE, DEFAULT_USER_AGENT, DOWNLOAD_TIMEOUT,
    IMAGE_TIMEOUT,
};

/// Base URLs and identity of the API client (`[github]` in `altsync.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubEndpoints {
    pub api_base: String,
    pub raw_base: String,
    pub user_agent: String,
}

impl Default for GitHubEndpoints {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Why a single request did not produce a usable response.
#[derive(Debug)]
enum RequestError {
    /// Worth retrying.
    Transient(String),
    NotFound,
    Fatal(String),
}

impl RequestError {
    const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound
        } else if RetryPolicy::is_transient_status(status.as_u16()) {
            Self::Transient(format!("HTTP {status}"))
        } else {
            Self::Fatal(format!("HTTP {status}"))
        }
    }

    fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() || error.is_request() {
            Self::Transient(error.to_string())
        } else {
            Self::Fatal(error.to_string())
        }
    }

    fn into_fetch<T>(self) -> Fetch<T> {
        match self {
            Self::NotFound => Fetch::Missing,
            Self::Transient(reason) | Self::Fatal(reason) => Fetch::Unavailable(reason),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(reason) | Self::Fatal(reason) => f.write_str(reason),
            Self::NotFound => f.write_str("HTTP 404 Not Found"),
        }
    }
}

/// Production [`Upstream`] backed by the GitHub REST API.
///
/// # Examples
///
/// ```rust,no_run
/// use altsync::upstream::{GitHubClient, GitHubEndpoints, RetryPolicy, Upstream};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = GitHubClient::new(
///     GitHubEndpoints::default(),
///     RetryPolicy::default(),
///     std::env::var("GITHUB_TOKEN").ok(),
/// )?;
/// let releases = client.releases("utmapp/UTM").await.found().unwrap_or_default();
/// println!("{} releases", releases.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    endpoints: GitHubEndpoints,
    retry: RetryPolicy,
    api_headers: HeaderMap,
}

impl GitHubClient {
    /// Builds a client. `token`, when present, is sent as a bearer token on API
    /// requests only.
    pub fn new(endpoints: GitHubEndpoints, retry: RetryPolicy, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(endpoints.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        let mut api_headers = HeaderMap::new();
        api_headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .context("GitHub token contains invalid characters")?;
            value.set_sensitive(true);
            api_headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            http,
            endpoints,
            retry,
            api_headers,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoints.api_base.trim_end_matches('/'), path)
    }

    /// Sends a GET, retrying transient failures, and returns the successful response.
    async fn send(
        &self,
        url: &str,
        timeout: Duration,
        api: bool,
    ) -> std::result::Result<reqwest::Response, RequestError> {
        RetryIf::spawn(
            self.retry.strategy(),
            || async {
                let mut request = self.http.get(url).timeout(timeout);
                if api {
                    request = request.headers(self.api_headers.clone());
                }
                match request.send().await {
                    Ok(response) if response.status().is_success() => Ok(response),
                    Ok(response) => Err(RequestError::from_status(response.status())),
                    Err(e) => Err(RequestError::from_transport(&e)),
                }
            },
            |e: &RequestError| {
                if e.is_transient() {
                    debug!("Transient failure for {url}: {e}, retrying");
                }
                e.is_transient()
            },
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Fetch<T> {
        let url = self.api_url(path);
        match self.send(&url, API_TIMEOUT, true).await {
            Ok(response) => match response.json::<T>().await {
                Ok(value) => Fetch::Found(value),
                Err(e) => {
                    warn!("Unexpected response from {url}: {e}");
                    Fetch::Unavailable(e.to_string())
                }
            },
            Err(RequestError::NotFound) => {
                debug!("Not found: {url}");
                Fetch::Missing
            }
            Err(e) => {
                warn!("Request failed: {url} - {e}");
                e.into_fetch()
            }
        }
    }

    async fn stream_to_file(response: reqwest::Response, dest: &Path) -> Result<u64> {
        let mut response = response;
        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.context("Download interrupted")? {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

impl Upstream for GitHubClient {
    async fn releases(&self, repo: &str) -> Fetch<Vec<UpstreamRelease>> {
        self.get_json(&format!("repos/{repo}/releases")).await
    }

    async fn repo_info(&self, repo: &str) -> Fetch<RepoInfo> {
        self.get_json(&format!("repos/{repo}")).await
    }

    async fn tree(&self, repo: &str) -> Fetch<Vec<TreeEntry>> {
        self.get_json::<TreeResponse>(&format!("repos/{repo}/git/trees/HEAD?recursive=1"))
            .await
            .map(|response| response.tree)
    }

    async fn root_contents(&self, repo: &str) -> Fetch<Vec<TreeEntry>> {
        self.get_json::<Vec<ContentEntry>>(&format!("repos/{repo}/contents/"))
            .await
            .map(|entries| entries.into_iter().map(TreeEntry::from).collect())
    }

    async fn fetch_bytes(&self, url: &str) -> Fetch<Vec<u8>> {
        let response = match self.send(url, IMAGE_TIMEOUT, false).await {
            Ok(response) => response,
            Err(e) => {
                debug!("Could not fetch {url}: {e}");
                return e.into_fetch();
            }
        };
        match response.bytes().await {
            Ok(bytes) => Fetch::Found(bytes.to_vec()),
            Err(e) => Fetch::Unavailable(e.to_string()),
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> Fetch<u64> {
        let response = match self.send(url, DOWNLOAD_TIMEOUT, false).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Download failed: {url} - {e}");
                return e.into_fetch();
            }
        };
        match Self::stream_to_file(response, dest).await {
            Ok(written) => Fetch::Found(written),
            Err(e) => {
                warn!("Download failed: {url} - {e:#}");
                Fetch::Unavailable(format!("{e:#}"))
            }
        }
    }

    fn raw_url(&self, repo: &str, branch: &str, path: &str) -> String {
        format!("{}/{repo}/{branch}/{path}", self.endpoints.raw_base.trim_end_matches('/'))
    }
}
