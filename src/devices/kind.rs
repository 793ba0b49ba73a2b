//! Device family selection by configured type string.

use strum_macros::{AsRefStr, Display, EnumString};

use super::{Adapter, Feature};
use super::{generic::Generic, ios::CiscoIos, iosxr::CiscoIosXr, meinberg::Meinberg, mrv::Mrv, opengear::Opengear};

/// Device family selected by the host's `type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DeviceKind {
    Generic,
    CiscoIos,
    CiscoIosXr,
    Opengear,
    Mrv,
    #[strum(to_string = "meinberg", serialize = "ntp")]
    Meinberg,
}

impl DeviceKind {
    /// Resolve a configured type string. Unknown types get the generic
    /// adapter.
    pub fn from_type_tag(tag: &str) -> Self {
        tag.trim().parse().unwrap_or(Self::Generic)
    }

    /// Whether table walks use GETBULK.
    pub fn bulk(self) -> bool {
        matches!(self, Self::CiscoIos | Self::CiscoIosXr | Self::Opengear)
    }

    /// Features this family can collect.
    pub fn supported(self) -> &'static [Feature] {
        use Feature::*;
        match self {
            Self::Generic => &[Uptime, InterfaceCounters],
            Self::CiscoIos => &[Uptime, InterfaceCounters, NetworkAcl, BgpPeers, Memory, Cpu, Sensors],
            Self::CiscoIosXr => &[Uptime, InterfaceCounters, NetworkPolicy, BgpPeers, Memory, Cpu, Sensors],
            Self::Opengear => &[Uptime, InterfaceCounters, CellInfo, Memory, Cpu, Sensors],
            Self::Mrv => &[Uptime, InterfaceCounters, CellInfo, Sensors],
            Self::Meinberg => &[Uptime, InterfaceCounters, Memory, Cpu, Sensors, Ntp],
        }
    }

    /// A fresh adapter holding no per-fetch state.
    pub fn adapter(self) -> Box<dyn Adapter> {
        match self {
            Self::Generic => Box::new(Generic),
            Self::CiscoIos => Box::new(CiscoIos::default()),
            Self::CiscoIosXr => Box::new(CiscoIosXr::default()),
            Self::Opengear => Box::new(Opengear),
            Self::Mrv => Box::new(Mrv),
            Self::Meinberg => Box::new(Meinberg),
        }
    }
}
