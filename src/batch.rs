// src/batch.rs
// =============================================================================
// Fetches many files concurrently.
//
// Key functionality:
// - Runs one GitHub retrieval per entry, at most `concurrency` at a time
// - Every entry produces exactly one outcome, failures don't stop the rest
// - All retrievals share one cancellation token
// =============================================================================

use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Result;
use crate::github::GithubRetriever;

/// Result of fetching one entry.
#[derive(Debug)]
pub struct FetchOutcome {
    pub name: String,
    pub url: String,
    pub result: Result<Vec<u8>>,
}

/// Serializable summary of a [`FetchOutcome`], without the file contents.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub name: String,
    pub url: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ok,
    Error,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn report(&self) -> FetchReport {
        let (status, bytes, message) = match &self.result {
            Ok(body) => (ReportStatus::Ok, Some(body.len()), None),
            Err(e) => (ReportStatus::Error, None, Some(e.to_string())),
        };
        FetchReport {
            name: self.name.clone(),
            url: self.url.clone(),
            status,
            bytes,
            message,
        }
    }
}

// Fetches many files concurrently
//
// This is the main entry point for batch mode.
//
// Parameters:
//   retrievers: (name, retriever) pairs, one per manifest entry
//   concurrency: how many requests may be in flight at once (0 is treated as 1)
//   cancel: token shared by every retrieval
//
// Returns: one FetchOutcome per pair, in input order
pub async fn fetch_all(
    retrievers: Vec<(String, GithubRetriever)>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> Vec<FetchOutcome> {
    info!(files = retrievers.len(), concurrency, "starting batch fetch");

    let futures = retrievers
        .into_iter()
        .enumerate()
        .map(|(index, (name, retriever))| async move {
            let url = retriever.raw_url();
            let result = retriever.retrieve(cancel).await;
            debug!(%name, ok = result.is_ok(), "batch entry finished");
            (index, FetchOutcome { name, url, result })
        });

    let mut outcomes: Vec<(usize, FetchOutcome)> = stream::iter(futures)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    // buffer_unordered yields in completion order
    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}
