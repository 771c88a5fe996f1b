// src/http/client.rs
// =============================================================================
// The HTTP client abstraction used by the retrievers.
//
// HttpClient is the substitution point: production code uses ReqwestClient,
// tests (or callers needing a proxy, custom TLS, ...) plug in their own
// implementation through `set_http_client`.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::{Result, RetrieverError};

/// A fully resolved request, ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
    /// Time budget for the whole exchange. Always non-zero.
    pub timeout: Duration,
}

/// What came back from the server. The body is fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Performs a single HTTP exchange.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Default `HttpClient`, backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: Client,
}

impl ReqwestClient {
    /// Builds a client whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let inner = Client::builder().timeout(timeout).build()?;
        Ok(Self { inner })
    }

    /// Wraps an already configured reqwest client (proxy, custom TLS, ...).
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    // Sends the request and reads the whole body
    //
    // Any status code is a successful exchange here; deciding what counts
    // as a failure is up to the caller.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self
            .inner
            .request(method, url.clone())
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| categorize_error(e, &url, timeout))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| categorize_error(e, &url, timeout))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

// Timeouts get their own variant, everything else is passed through as-is
fn categorize_error(error: reqwest::Error, url: &Url, timeout: Duration) -> RetrieverError {
    if error.is_timeout() {
        RetrieverError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        RetrieverError::Transport(error)
    }
}
