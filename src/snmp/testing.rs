//! In-memory agents for unit tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::HostConfig;

use super::index::{format_oid, normalize, parse_oid};
use super::{Connector, Pdu, SnmpError, SnmpValue, WalkClient};

/// Shared, ordered record of requests issued against a stub.
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

/// A scripted agent answering from a fixed OID table.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubClient {
    table: BTreeMap<Vec<u64>, SnmpValue>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    log: CallLog,
}

impl StubClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, oid: &str, value: SnmpValue) -> Self {
        self.table.insert(parse_oid(oid).expect("valid oid"), value);
        self
    }

    pub(crate) fn failing(mut self, oid: &str) -> Self {
        self.failing.insert(normalize(oid));
        self
    }

    pub(crate) fn delayed(mut self, oid: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(oid), delay);
        self
    }

    pub(crate) fn log(&self) -> CallLog {
        Arc::clone(&self.log)
    }

    fn error(&self, oid: &str) -> SnmpError {
        SnmpError::Request {
            target: "stub".to_string(),
            reason: format!("scripted failure for {oid}"),
        }
    }
}

#[async_trait::async_trait]
impl WalkClient for StubClient {
    fn target(&self) -> &str {
        "stub"
    }

    async fn get(&mut self, oids: &[&str]) -> Result<Vec<Pdu>, SnmpError> {
        let mut out = Vec::new();
        for oid in oids {
            let oid = normalize(oid);
            self.log.lock().expect("log lock").push(format!("get {oid}"));
            if self.failing.contains(&oid) {
                return Err(self.error(&oid));
            }
            if let Some(value) = self.table.get(&parse_oid(&oid)?) {
                out.push(Pdu::new(oid, value.clone()));
            }
        }
        Ok(out)
    }

    async fn walk(&mut self, oid: &str, _bulk: bool) -> Result<Vec<Pdu>, SnmpError> {
        let oid = normalize(oid);
        self.log.lock().expect("log lock").push(format!("walk {oid}"));
        if let Some(delay) = self.delays.get(&oid) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&oid) {
            return Err(self.error(&oid));
        }
        let root = parse_oid(&oid)?;
        Ok(self
            .table
            .range(root.clone()..)
            .take_while(|(name, _)| name.starts_with(&root))
            .map(|(name, value)| Pdu::new(format_oid(name), value.clone()))
            .collect())
    }
}

/// Connector handing out per-address stub clients.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubConnector {
    agents: HashMap<IpAddr, StubClient>,
}

impl StubConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_agent(mut self, ip: &str, agent: StubClient) -> Self {
        self.agents.insert(ip.parse().expect("valid ip"), agent);
        self
    }
}

#[async_trait::async_trait]
impl Connector for StubConnector {
    async fn connect(&self, host: &HostConfig) -> Result<Box<dyn WalkClient>, SnmpError> {
        match self.agents.get(&host.ip) {
            Some(agent) => Ok(Box::new(agent.clone())),
            None => Err(SnmpError::Connect {
                target: host.ip.to_string(),
                reason: "no stub agent".to_string(),
            }),
        }
    }
}
