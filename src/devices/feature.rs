//! Feature flags selecting which collectors run for a host.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A feature collector, in fixed execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Feature {
    Uptime,
    InterfaceCounters,
    NetworkAcl,
    NetworkPolicy,
    BgpPeers,
    CellInfo,
    Memory,
    Cpu,
    Sensors,
    Ntp,
}

impl Feature {
    /// Every feature in the order collectors run.
    pub const ORDER: [Feature; 10] = [
        Feature::Uptime,
        Feature::InterfaceCounters,
        Feature::NetworkAcl,
        Feature::NetworkPolicy,
        Feature::BgpPeers,
        Feature::CellInfo,
        Feature::Memory,
        Feature::Cpu,
        Feature::Sensors,
        Feature::Ntp,
    ];

    /// Field name used in the `statistics_info` metric.
    pub fn statistics_field(self) -> String {
        format!("statistics_{}_seconds", self.as_ref())
    }
}

/// Per-host feature switches. Everything defaults to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Record per-feature and total fetch durations in `statistics_info`.
    pub statistics: bool,
    pub uptime: bool,
    pub interface_counters: bool,
    pub network_acl: bool,
    pub network_policy: bool,
    pub bgp_peers: bool,
    pub cell_info: bool,
    pub memory: bool,
    pub cpu: bool,
    pub sensors: bool,
    pub ntp: bool,
}

impl Features {
    /// All collectors on, statistics off.
    pub fn all() -> Self {
        let mut features = Self::default();
        for feature in Feature::ORDER {
            features.set(feature, true);
        }
        features
    }

    /// Only the listed collectors on.
    pub fn only(enabled: &[Feature]) -> Self {
        let mut features = Self::default();
        for feature in enabled {
            features.set(*feature, true);
        }
        features
    }

    /// Enable statistics collection.
    pub fn with_statistics(mut self) -> Self {
        self.statistics = true;
        self
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Uptime => self.uptime,
            Feature::InterfaceCounters => self.interface_counters,
            Feature::NetworkAcl => self.network_acl,
            Feature::NetworkPolicy => self.network_policy,
            Feature::BgpPeers => self.bgp_peers,
            Feature::CellInfo => self.cell_info,
            Feature::Memory => self.memory,
            Feature::Cpu => self.cpu,
            Feature::Sensors => self.sensors,
            Feature::Ntp => self.ntp,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::Uptime => &mut self.uptime,
            Feature::InterfaceCounters => &mut self.interface_counters,
            Feature::NetworkAcl => &mut self.network_acl,
            Feature::NetworkPolicy => &mut self.network_policy,
            Feature::BgpPeers => &mut self.bgp_peers,
            Feature::CellInfo => &mut self.cell_info,
            Feature::Memory => &mut self.memory,
            Feature::Cpu => &mut self.cpu,
            Feature::Sensors => &mut self.sensors,
            Feature::Ntp => &mut self.ntp,
        };
        *slot = enabled;
    }

    /// Turn off every feature outside `supported`.
    pub fn restrict_to(&mut self, supported: &[Feature]) {
        for feature in Feature::ORDER {
            if !supported.contains(&feature) {
                self.set(feature, false);
            }
        }
    }

    /// Enabled collectors in execution order.
    pub fn enabled(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ORDER.into_iter().filter(|f| self.is_enabled(*f))
    }
}
