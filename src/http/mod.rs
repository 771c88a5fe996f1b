// src/http/mod.rs
// =============================================================================
// Generic HTTP retrieval.
//
// Submodules:
// - client: the HttpClient trait and its reqwest implementation
// - retriever: HttpRetriever, which fetches the body behind a URL
// =============================================================================

mod client;
#[cfg(test)]
pub(crate) mod mock;
mod retriever;

pub use client::{HttpClient, HttpRequest, HttpResponse, ReqwestClient};
pub use retriever::{HttpRetriever, DEFAULT_TIMEOUT};
