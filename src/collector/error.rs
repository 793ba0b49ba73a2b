//! Scheduler-level errors.

use thiserror::Error;

use crate::storage::SinkError;

/// Errors raised by the collection loop itself.
///
/// Per-host and per-walk failures never surface here; they are logged and
/// recorded as missing data. Only infrastructure problems do.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// A fetch task panicked or was aborted.
    #[error("fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Sink construction failed.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// The admission gate was closed by shutdown.
    #[error("admission gate closed")]
    GateClosed,
}
