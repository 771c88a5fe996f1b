// src/http/retriever.rs
// =============================================================================
// Generic "fetch the body behind a URL" retriever.
//
// Steps:
// 1. Check the URL is present and parses
// 2. Fill in defaults (GET, 10 second timeout)
// 3. Send through the configured HttpClient (or a fresh reqwest one)
// 4. Race the request against the cancellation token
// 5. Turn any status above 399 into an error, otherwise hand back the body
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::client::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use crate::error::{Result, RetrieverError};
use crate::retriever::Retriever;

/// Timeout applied when none (zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Response headers copied into the error message of a failed request
const GITHUB_HEADERS: [&str; 4] = [
    "x-github-request-id",
    "x-ratelimit-limit",
    "x-ratelimit-remaining",
    "x-ratelimit-reset",
];

/// Configuration of a single HTTP retrieval.
///
/// Fields are public and meant to be set directly; `method` defaults to GET
/// and a zero `timeout` to [`DEFAULT_TIMEOUT`].
#[derive(Clone, Default)]
pub struct HttpRetriever {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub timeout: Duration,

    http_client: Option<Arc<dyn HttpClient>>,
}

impl HttpRetriever {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Overrides the client used to send the request.
    pub fn set_http_client(&mut self, client: Arc<dyn HttpClient>) {
        self.http_client = Some(client);
    }

    pub fn has_custom_http_client(&self) -> bool {
        self.http_client.is_some()
    }

    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }

    // Fetches the body behind `url`
    //
    // Parameters:
    //   cancel: token that aborts the request when cancelled
    //
    // Returns: Result<Vec<u8>>
    //   Success: the response body
    //   Error: MissingUrl / InvalidUrl before any I/O, Cancelled, Status for
    //     codes above 399, or the client's own error
    pub async fn retrieve(&self, cancel: &CancellationToken) -> Result<Vec<u8>> {
        if self.url.is_empty() {
            return Err(RetrieverError::MissingUrl);
        }
        let url = Url::parse(&self.url).map_err(|source| RetrieverError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        let timeout = self.effective_timeout();
        let request = HttpRequest {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
            body: self.body.clone(),
            timeout,
        };

        let client: Arc<dyn HttpClient> = match &self.http_client {
            Some(client) => Arc::clone(client),
            None => Arc::new(ReqwestClient::with_timeout(timeout)?),
        };

        debug!(url = %self.url, method = %request.method, ?timeout, "sending request");

        // `biased` makes an already cancelled token win before the
        // request future is ever polled
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetrieverError::Cancelled),
            response = client.execute(request) => response?,
        };

        if response.status.as_u16() > 399 {
            warn!(url = %self.url, status = response.status.as_u16(), "request failed");
            return Err(RetrieverError::Status {
                url: self.url.clone(),
                status: response.status.as_u16(),
                github_headers: github_headers(&response),
            });
        }

        Ok(response.body)
    }
}

fn github_headers(response: &HttpResponse) -> BTreeMap<String, String> {
    GITHUB_HEADERS
        .iter()
        .map(|name| {
            let value = response
                .headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            (name.to_string(), value)
        })
        .collect()
}

impl fmt::Debug for HttpRetriever {
    // Header values are left out, they usually carry credentials
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRetriever")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .field("timeout", &self.timeout)
            .field("custom_http_client", &self.has_custom_http_client())
            .finish()
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self, cancel: &CancellationToken) -> Result<Vec<u8>> {
        HttpRetriever::retrieve(self, cancel).await
    }
}
