// src/error.rs
// =============================================================================
// Error type shared by every retriever in this crate.
//
// Three families of failure exist:
// - Configuration problems, detected before any network action
//   (MissingInformation, MissingUrl, InvalidUrl, InvalidHeader)
// - Batch outputs that cannot be saved safely (UnsafeOutputName)
// - Failures of the HTTP exchange itself
//   (Cancelled, Timeout, Status, Transport, Client)
//
// The GitHub retriever never wraps errors coming back from the HTTP
// retriever, so callers can match on the variant directly.
// =============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, RetrieverError>;

#[derive(Debug, Error)]
pub enum RetrieverError {
    /// Repository slug and/or file path were left empty.
    ///
    /// Both values are always reported, even the one that was set.
    #[error("missing mandatory information file_path={file_path}, repository_slug={repository_slug}")]
    MissingInformation {
        file_path: String,
        repository_slug: String,
    },

    #[error("URL is a mandatory parameter when using the HTTP retriever")]
    MissingUrl,

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A header value contained characters HTTP does not allow.
    /// The value itself is not included since it may be a secret.
    #[error("invalid value for header '{name}'")]
    InvalidHeader { name: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// The server answered with a status code above 399.
    #[error("request to {url} failed with code {status}. GitHub Headers: {github_headers:?}")]
    Status {
        url: String,
        status: u16,
        github_headers: BTreeMap<String, String>,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A batch entry name that would be written outside the output directory.
    #[error("output name '{name}' must be a relative path without '..'")]
    UnsafeOutputName { name: String },

    /// Failure reported by a custom `HttpClient` implementation.
    #[error("http client error: {0}")]
    Client(String),
}
