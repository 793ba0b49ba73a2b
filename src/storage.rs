//! Storage Layer
//!
//! Finished records are buffered in an [`Outbox`] and flushed once per cycle:
//! - **Primary**: InfluxDB 1.x over HTTP, probed before every write
//! - **Fallback**: Pretty JSON files in a local spool directory
//!
//! # Components
//!
//! - [`Sink`]: probe / write / persist contract
//! - [`InfluxSink`]: Line-protocol writer for the primary store
//! - [`LocalStore`]: Monotonically named JSON spool files
//! - [`FallbackSink`]: Production wiring of primary and fallback
//! - [`Outbox`]: Shared buffer implementing the flush policy

mod composite;
mod error;
mod influx;
mod local;
mod outbox;
mod sink;

pub use composite::FallbackSink;
pub use error::SinkError;
pub use influx::{InfluxSink, line_protocol};
pub use local::{LocalStore, read_batch};
pub use outbox::{FlushOutcome, Outbox};
pub use sink::Sink;

#[cfg(test)]
pub(crate) use outbox::testing;
