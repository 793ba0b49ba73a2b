//! Collector Layer
//!
//! Drives the polling loop: one fetch task per host per cycle, bounded by an
//! admission gate, under a cycle-wide deadline.
//!
//! # Architecture
//!
//! - [`AdmissionGate`]: Fixed-capacity gate bounding in-flight fetch tasks
//! - [`Scheduler`]: Cycle loop, deadline barrier, cooperative cancellation and
//!   the hand-off to the [`Outbox`](crate::storage::Outbox)
//! - [`CycleReport`]: What one cycle did, returned for logging and tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use netfetch::config::AppConfig;
//! use netfetch::snmp::SnmpConnector;
//! use netfetch::storage::FallbackSink;
//! use netfetch::Scheduler;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("configs/netfetch.yaml")?;
//! let sink = FallbackSink::from_config(&config.sink)?;
//! let scheduler = Scheduler::new(&config, Arc::new(SnmpConnector), Arc::new(sink));
//! scheduler.run_cycle(1).await;
//! # Ok(())
//! # }
//! ```

mod error;
mod gate;
mod scheduler;

pub use error::CollectorError;
pub use gate::AdmissionGate;
pub use scheduler::{CycleReport, Scheduler};
