use crate::data::Data;

use super::SinkError;

/// Destination for finished batches.
///
/// `probe` and `write` address the primary store; `persist` is the durable
/// local fallback used when the primary is unreachable or rejects a write.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    /// Whether the primary store is reachable right now.
    async fn probe(&self) -> bool;

    /// Write a batch to the primary store.
    async fn write(&self, batch: &[Data]) -> Result<(), SinkError>;

    /// Persist a batch locally.
    async fn persist(&self, batch: &[Data]) -> Result<(), SinkError>;
}
