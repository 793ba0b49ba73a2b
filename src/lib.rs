//! Netfetch - SNMP Network Telemetry Collector
//!
//! This crate polls a fleet of network devices over SNMP on a fixed interval,
//! extracts vendor-specific operational metrics and writes one record per
//! host per cycle to InfluxDB, spooling to local JSON files when the store is
//! unavailable. It can be embedded as a library or run as the standalone
//! `netfetch` binary.
//!
//! # Architecture
//!
//! - **SNMP**: GET/WALK transport behind the [`WalkClient`] seam
//! - **Data**: [`Data`] records and the ordered multi-table join engine
//! - **Devices**: Per-vendor [`Adapter`]s over a shared [`Device`] base
//! - **Collector**: [`Scheduler`] with admission gate, deadline and cancellation
//! - **Storage**: [`Sink`] contract, InfluxDB writer and local fallback
//!
//! # Example
//!
//! ```rust,no_run
//! use netfetch::{AppConfig, Scheduler};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("configs/netfetch.yaml")?;
//! let scheduler = Scheduler::from_config(&config)?;
//! scheduler.run(CancellationToken::new()).await;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod data;
pub mod devices;
pub mod snmp;
pub mod storage;

pub use collector::{AdmissionGate, CollectorError, CycleReport, Scheduler};
pub use config::{AppConfig, ConfigError, HostConfig};
pub use data::{Data, FieldValue, Metric};
pub use devices::{Adapter, Device, DeviceKind, Feature, Features, fetch};
pub use snmp::{Connector, Pdu, SnmpConnector, SnmpError, SnmpValue, WalkClient};
pub use storage::{FallbackSink, FlushOutcome, Outbox, Sink, SinkError};
