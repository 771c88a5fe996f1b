// src/github/mod.rs
// =============================================================================
// This module handles fetching files from GitHub repositories.
//
// Currently implements:
// - Building raw.githubusercontent.com URLs from slug/branch/path
// - Optional token authentication
//
// The HTTP exchange itself lives in crate::http.
// =============================================================================

mod retriever;

pub use retriever::{GithubRetriever, DEFAULT_BRANCH};
