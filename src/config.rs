//! Configuration module for the netfetch collector.
//!
//! Provides YAML-based configuration loading and validation for:
//! - General settings (poll interval, cycle timeout, task limit, verbosity)
//! - Sink settings (InfluxDB endpoint, local fallback directory)
//! - Host inventory (address, device type, SNMP parameters, features)

mod app;
mod hosts;
mod validation;

pub use app::{AppConfig, GeneralConfig, InfluxConfig, SinkConfig};
pub use hosts::{
    AuthProtocol, HostConfig, HostsFile, PrivProtocol, SecurityLevel, SnmpConfig, SnmpVersion,
};
pub use validation::{ConfigError, expand_env_vars, parse_duration};

// Re-export constants
pub use app::{DEFAULT_CANCEL_GRACE, DEFAULT_INTERVAL, DEFAULT_MAX_TASKS, DEFAULT_TIMEOUT};
