//! Fetch the raw contents of a file stored in a GitHub repository.
//!
//! ```no_run
//! use github_retriever::GithubRetriever;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> github_retriever::Result<()> {
//! let retriever = GithubRetriever::new("owner/repo", "config/flags.yaml").with_branch("dev");
//! let bytes = retriever.retrieve(&CancellationToken::new()).await?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod github;
pub mod http;
pub mod retriever;

pub use error::{Result, RetrieverError};
pub use github::GithubRetriever;
pub use http::{HttpClient, HttpRetriever};
pub use retriever::Retriever;
