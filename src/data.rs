//! Data Model and Join Engine
//!
//! One [`Data`] record is produced per host per cycle. It carries host-level
//! tags and a map of named [`Metric`]s, each keyed by SNMP row index.
//!
//! # Components
//!
//! - [`Metric`]: Row-index keyed tags and typed fields
//! - [`Data`]: Per-host record sealed with a timestamp once collection ends
//! - [`Entry`] / [`join_entries`]: Ordered multi-table walk feeding a join function

mod join;
mod metric;
mod record;

pub use join::{Entry, add_fields, add_tags, join_entries};
pub use metric::{FieldValue, Metric};
pub use record::Data;

/// Metric carrying per-feature and total fetch durations.
pub const STATISTICS: &str = "statistics_info";
/// Metric carrying device uptime.
pub const UPTIME: &str = "uptime_info";
/// Metric carrying per-interface tags and counters.
pub const INTERFACE: &str = "interface_info";
/// Metric carrying BGP peer prefix counters.
pub const BGP: &str = "bgp_info";
/// Metric carrying cellular modem status.
pub const CELL: &str = "cell_info";
/// Metric carrying memory pool usage.
pub const MEMORY: &str = "memory_info";
/// Metric carrying CPU utilisation.
pub const CPU: &str = "cpu_info";
/// Metric carrying environmental sensor readings.
pub const SENSOR: &str = "sensor_info";
/// Metric carrying NTP server status.
pub const NTP: &str = "ntp_info";
