//! Transport traits consumed by the join engine and the device adapters.

use crate::config::HostConfig;

use super::{SnmpError, SnmpValue};

/// One OID/value pair returned by a GET or WALK.
///
/// `oid` is always rendered with a leading dot (`.1.3.6.1.2.1.1.5.0`), the
/// same form the adapters declare their table prefixes in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub oid: String,
    pub value: SnmpValue,
}

impl Pdu {
    pub fn new(oid: impl Into<String>, value: SnmpValue) -> Self {
        Self {
            oid: super::index::normalize(&oid.into()),
            value,
        }
    }
}

/// Per-host SNMP transport.
///
/// Implementations own their own timeout/retry policy; a call never blocks
/// longer than `timeout * (retries + 1)` per request.
#[async_trait::async_trait]
pub trait WalkClient: Send {
    /// Target description used in log lines.
    fn target(&self) -> &str;

    /// GET each OID, returning the values the agent knows about.
    async fn get(&mut self, oids: &[&str]) -> Result<Vec<Pdu>, SnmpError>;

    /// Walk the subtree rooted at `oid` in lexicographic order.
    async fn walk(&mut self, oid: &str, bulk: bool) -> Result<Vec<Pdu>, SnmpError>;

    /// Release the underlying socket.
    async fn close(&mut self) {}
}

/// Opens a transport for one host.
#[async_trait::async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, host: &HostConfig) -> Result<Box<dyn WalkClient>, SnmpError>;
}
