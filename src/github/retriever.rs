// src/github/retriever.rs
// =============================================================================
// Fetches a single file from a GitHub repository.
//
// Strategy:
// - Use raw.githubusercontent.com which serves raw file contents
// - Build the URL from repository slug, branch (default "main") and path
// - Attach "Authorization: token <...>" when a token is configured
// - Let HttpRetriever do the actual request
//
// Values are substituted into the URL verbatim. Callers are responsible for
// passing slugs, branches and paths that are already valid path segments.
// =============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, RetrieverError};
use crate::http::{HttpClient, HttpRetriever};
use crate::retriever::Retriever;

/// Branch used when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com";

/// Configuration for retrieving one file from a GitHub repository.
///
/// Set the public fields directly, or start from [`GithubRetriever::new`]
/// and chain the `with_*` helpers.
#[derive(Clone, Default)]
pub struct GithubRetriever {
    /// `owner/repo`
    pub repository_slug: String,
    /// Empty means [`DEFAULT_BRANCH`].
    pub branch: String,
    pub file_path: String,
    /// Empty means anonymous access.
    pub github_token: String,
    /// Zero lets the HTTP retriever apply its own default.
    pub timeout: Duration,

    http_client: Option<Arc<dyn HttpClient>>,
}

impl GithubRetriever {
    pub fn new(repository_slug: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            repository_slug: repository_slug.into(),
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_token(mut self, github_token: impl Into<String>) -> Self {
        self.github_token = github_token.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the HTTP client used for the request.
    /// Mostly useful in tests, or to route through a proxy.
    pub fn set_http_client(&mut self, client: Arc<dyn HttpClient>) {
        self.http_client = Some(client);
    }

    pub fn effective_branch(&self) -> &str {
        if self.branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            &self.branch
        }
    }

    // Builds the raw content URL
    //
    // Example:
    //   slug "owner/repo", branch "", path "config/flags.yaml"
    //   -> "https://raw.githubusercontent.com/owner/repo/main/config/flags.yaml"
    pub fn raw_url(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            RAW_CONTENT_BASE,
            self.repository_slug,
            self.effective_branch(),
            self.file_path
        )
    }

    /// Headers sent with the request: only `Authorization`, and only when
    /// a token is set.
    pub fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if !self.github_token.is_empty() {
            let value = HeaderValue::from_str(&format!("token {}", self.github_token))
                .map_err(|_| RetrieverError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn validate(&self) -> Result<()> {
        if self.file_path.is_empty() || self.repository_slug.is_empty() {
            return Err(RetrieverError::MissingInformation {
                file_path: self.file_path.clone(),
                repository_slug: self.repository_slug.clone(),
            });
        }
        Ok(())
    }

    // Translates this configuration into the request the HTTP retriever sends
    fn http_retriever(&self) -> Result<HttpRetriever> {
        self.validate()?;

        let mut http = HttpRetriever::new(self.raw_url());
        http.method = Method::GET;
        http.headers = self.request_headers()?;
        http.timeout = self.timeout;
        if let Some(client) = &self.http_client {
            http.set_http_client(Arc::clone(client));
        }
        Ok(http)
    }

    // Fetches the file
    //
    // Parameters:
    //   cancel: token that aborts the request when cancelled
    //
    // Returns: Result<Vec<u8>>
    //   Success: the raw file contents
    //   Error: MissingInformation (no request made) or whatever the HTTP
    //     retriever reported, untouched
    pub async fn retrieve(&self, cancel: &CancellationToken) -> Result<Vec<u8>> {
        let http = self.http_retriever()?;

        debug!(
            repository = %self.repository_slug,
            branch = self.effective_branch(),
            file_path = %self.file_path,
            authenticated = !self.github_token.is_empty(),
            "retrieving file from GitHub"
        );

        http.retrieve(cancel).await
    }
}

impl fmt::Debug for GithubRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubRetriever")
            .field("repository_slug", &self.repository_slug)
            .field("branch", &self.branch)
            .field("file_path", &self.file_path)
            .field("github_token", &(!self.github_token.is_empty()).then_some("***"))
            .field("timeout", &self.timeout)
            .field("custom_http_client", &self.http_client.is_some())
            .finish()
    }
}

#[async_trait]
impl Retriever for GithubRetriever {
    async fn retrieve(&self, cancel: &CancellationToken) -> Result<Vec<u8>> {
        GithubRetriever::retrieve(self, cancel).await
    }
}
