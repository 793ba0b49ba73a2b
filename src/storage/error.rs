//! Sink-specific error types.
//!
//! All sink operations return [`SinkError`] on failure, which can be matched
//! to tell a transport failure from a rejected write or a local I/O problem.

use thiserror::Error;

/// Errors that can occur while handing a batch to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Local filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No primary sink is reachable.
    #[error("sink unreachable: {0}")]
    Unreachable(String),
}
