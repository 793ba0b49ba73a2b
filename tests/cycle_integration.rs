//! End-to-end polling cycles against in-memory agents.
//!
//! The agents and the sink here implement the public `Connector`,
//! `WalkClient` and `Sink` traits, so these tests exercise exactly what an
//! embedding application would.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use netfetch::config::SinkConfig;
use netfetch::storage::read_batch;
use netfetch::{
    AppConfig, Connector, Data, FallbackSink, FieldValue, FlushOutcome, HostConfig, Pdu,
    Scheduler, Sink, SinkError, SnmpError, SnmpValue, WalkClient,
};

#[derive(Clone, Default)]
struct Agent {
    values: Vec<(&'static str, SnmpValue)>,
}

impl Agent {
    fn with(mut self, oid: &'static str, value: SnmpValue) -> Self {
        self.values.push((oid, value));
        self
    }
}

#[async_trait::async_trait]
impl WalkClient for Agent {
    fn target(&self) -> &str {
        "agent"
    }

    async fn get(&mut self, oids: &[&str]) -> Result<Vec<Pdu>, SnmpError> {
        Ok(oids
            .iter()
            .filter_map(|oid| {
                self.values
                    .iter()
                    .find(|(name, _)| name == oid)
                    .map(|(name, value)| Pdu::new(*name, value.clone()))
            })
            .collect())
    }

    async fn walk(&mut self, oid: &str, _bulk: bool) -> Result<Vec<Pdu>, SnmpError> {
        let prefix = format!("{oid}.");
        Ok(self
            .values
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, value)| Pdu::new(*name, value.clone()))
            .collect())
    }
}

#[derive(Default)]
struct Fleet {
    agents: HashMap<IpAddr, Agent>,
}

impl Fleet {
    fn with(mut self, ip: &str, agent: Agent) -> Self {
        self.agents.insert(ip.parse().unwrap(), agent);
        self
    }
}

#[async_trait::async_trait]
impl Connector for Fleet {
    async fn connect(&self, host: &HostConfig) -> Result<Box<dyn WalkClient>, SnmpError> {
        match self.agents.get(&host.ip) {
            Some(agent) => Ok(Box::new(agent.clone())),
            None => Err(SnmpError::Connect {
                target: host.ip.to_string(),
                reason: "unknown host".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct MemorySink {
    written: Mutex<Vec<Vec<Data>>>,
}

#[async_trait::async_trait]
impl Sink for MemorySink {
    async fn probe(&self) -> bool {
        true
    }

    async fn write(&self, batch: &[Data]) -> Result<(), SinkError> {
        self.written.lock().unwrap().push(batch.to_vec());
        Ok(())
    }

    async fn persist(&self, _batch: &[Data]) -> Result<(), SinkError> {
        panic!("reachable sink should never fall back");
    }
}

const CONFIG: &str = r#"
general:
  interval: 1m
  timeout: 5s
  max_tasks: 4
hosts:
  - ip: 10.0.0.1
    features:
      uptime: true
  - ip: 10.0.0.2
    type: switchB
"#;

fn text(s: &str) -> SnmpValue {
    SnmpValue::OctetString(s.as_bytes().to_vec())
}

fn fleet() -> Fleet {
    Fleet::default()
        .with(
            "10.0.0.1",
            Agent::default()
                .with(".1.3.6.1.2.1.1.5.0", text("routerA"))
                .with(".1.3.6.1.6.3.10.2.1.3.0", SnmpValue::Integer(12345)),
        )
        .with(
            "10.0.0.2",
            Agent::default()
                .with(".1.3.6.1.2.1.1.5.0", text("switchB"))
                .with(".1.3.6.1.6.3.10.2.1.3.0", SnmpValue::Integer(99)),
        )
}

fn by_name<'a>(batch: &'a [Data], name: &str) -> &'a Data {
    batch
        .iter()
        .find(|d| d.tag("device_name") == Some(name))
        .unwrap_or_else(|| panic!("no record for {name}"))
}

#[tokio::test]
async fn test_two_host_cycle() {
    let config = AppConfig::from_yaml(CONFIG).unwrap();
    let sink = Arc::new(MemorySink::default());
    let scheduler = Scheduler::new(&config, Arc::new(fleet()), sink.clone());

    let report = scheduler.run_cycle(1).await;
    assert!(!report.timed_out);
    assert_eq!(report.flushed, FlushOutcome::Written(2));

    let written = sink.written.lock().unwrap().clone();
    assert_eq!(written.len(), 1);
    let batch = &written[0];
    assert_eq!(batch.len(), 2);

    let a = by_name(batch, "routera");
    assert_eq!(a.tag("device_ip"), Some("10.0.0.1"));
    let uptime = a.metric("uptime_info").unwrap();
    assert_eq!(
        uptime.field("0", "uptime_seconds"),
        Some(&FieldValue::Integer(12345))
    );

    let b = by_name(batch, "switchb");
    assert_eq!(b.tag("device_type"), Some("switchb"));
    assert!(b.metrics.is_empty());
    assert!(batch.iter().all(|d| d.is_sealed()));
}

#[tokio::test]
async fn test_cycle_spools_without_influx() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::from_yaml(CONFIG).unwrap();
    let sink = FallbackSink::from_config(&SinkConfig {
        influx: None,
        fallback_dir: dir.path().join("spool"),
    })
    .unwrap();
    let scheduler = Scheduler::new(&config, Arc::new(fleet()), Arc::new(sink));

    let report = scheduler.run_cycle(1).await;
    assert_eq!(report.flushed, FlushOutcome::Persisted(2));

    let files: Vec<_> = std::fs::read_dir(dir.path().join("spool"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let batch = read_batch(&files[0]).unwrap();
    assert_eq!(batch.len(), 2);
    assert!(by_name(&batch, "routera").metric("uptime_info").is_some());
}
