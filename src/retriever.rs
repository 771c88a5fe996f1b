// src/retriever.rs
// =============================================================================
// The one operation every retriever shares: produce the raw bytes of some
// remote resource, giving up early if the cancellation token fires.
// =============================================================================

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, cancel: &CancellationToken) -> Result<Vec<u8>>;
}
