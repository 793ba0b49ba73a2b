//! Per-host collection record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Metric;

/// Everything collected from one host in one cycle.
///
/// The record is owned by its fetch task until [`Data::seal`] stamps the
/// timestamp; sealing happens exactly once, whether the fetch completed,
/// was cancelled, or never got past the identity probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Metric>,
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host-level tag, merged into every row at write time.
    pub fn add_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(name.into(), value.into());
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }

    /// Get a metric, creating it when absent.
    pub fn metric_mut(&mut self, name: &str) -> &mut Metric {
        self.metrics.entry(name.to_string()).or_default()
    }

    pub fn is_sealed(&self) -> bool {
        self.timestamp.is_some()
    }

    /// Stamp the collection time and drop metrics that ended up empty.
    ///
    /// Returns `false` (and changes nothing) when already sealed.
    pub fn seal(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_sealed() {
            return false;
        }
        self.metrics.retain(|_, metric| !metric.is_empty());
        self.timestamp = Some(now);
        true
    }
}
