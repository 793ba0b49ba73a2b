use super::{Adapter, DeviceKind, Feature};

/// Standard MIB-II agent: uptime and interface counters only.
#[derive(Debug, Default)]
pub(crate) struct Generic;

#[async_trait::async_trait]
impl Adapter for Generic {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Generic
    }

    fn supported(&self) -> &'static [Feature] {
        DeviceKind::Generic.supported()
    }
}
