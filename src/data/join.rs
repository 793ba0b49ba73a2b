//! Ordered multi-table join.
//!
//! Vendor adapters describe a metric as an ordered list of [`Entry`]s plus a
//! join function. [`join_entries`] walks the entries strictly in declared
//! order and hands every returned varbind to the join function together with
//! the metric being built. Join functions may record side tables in captured
//! state while processing an early entry and consult them for later ones, so
//! the order is part of the contract.

use crate::snmp::index::table_index;
use crate::snmp::{Pdu, WalkClient};

use super::{Data, Metric};

/// One table column to walk, with the name the join function files it under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub name: &'static str,
    pub oid: &'static str,
}

impl Entry {
    pub const fn new(name: &'static str, oid: &'static str) -> Self {
        Self { name, oid }
    }
}

/// Walk `entries` in order, feeding every varbind to `join`.
///
/// A failed walk is logged and contributes no rows; the remaining entries
/// still run.
pub async fn join_entries<F>(
    client: &mut dyn WalkClient,
    bulk: bool,
    metric: &mut Metric,
    entries: &[Entry],
    mut join: F,
) where
    F: FnMut(&mut Metric, &Entry, &Pdu) + Send,
{
    for entry in entries {
        match client.walk(entry.oid, bulk).await {
            Ok(pdus) => {
                for pdu in &pdus {
                    join(metric, entry, pdu);
                }
            }
            Err(e) => {
                tracing::warn!(
                    host = %client.target(),
                    entry = entry.name,
                    oid = entry.oid,
                    error = %e,
                    "Walk failed"
                );
            }
        }
    }
}

/// File the varbind's text value as a tag named after the entry.
pub fn add_tags(metric: &mut Metric, entry: &Entry, pdu: &Pdu) {
    if let Some(value) = pdu.value.as_text() {
        metric.add_tag(table_index(&pdu.oid, entry.oid), entry.name, value);
    }
}

/// File the varbind's value as a field named after the entry.
pub fn add_fields(metric: &mut Metric, entry: &Entry, pdu: &Pdu) {
    if let Some(value) = pdu.value.to_field() {
        metric.add_field(table_index(&pdu.oid, entry.oid), entry.name, value);
    }
}

impl Data {
    /// Run [`join_entries`] against the named metric, creating it if needed.
    pub async fn add_from_entries<F>(
        &mut self,
        client: &mut dyn WalkClient,
        bulk: bool,
        metric: &str,
        entries: &[Entry],
        join: F,
    ) where
        F: FnMut(&mut Metric, &Entry, &Pdu) + Send,
    {
        let metric = self.metric_mut(metric);
        join_entries(client, bulk, metric, entries, join).await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::data::FieldValue;
    use crate::snmp::SnmpValue;
    use crate::snmp::testing::StubClient;

    const NAME: &str = ".1.3.6.1.4.1.9.9.221.1.1.1.1.3";
    const USED: &str = ".1.3.6.1.4.1.9.9.221.1.1.1.1.7";

    const ENTRIES: [Entry; 2] = [Entry::new("name", NAME), Entry::new("used_bytes", USED)];

    fn pool_client() -> StubClient {
        StubClient::new()
            .with(&format!("{NAME}.1.1"), SnmpValue::OctetString(b"Processor".to_vec()))
            .with(&format!("{NAME}.1.2"), SnmpValue::OctetString(b"IO".to_vec()))
            .with(&format!("{USED}.1.1"), SnmpValue::Unsigned(1000))
            .with(&format!("{USED}.1.2"), SnmpValue::Unsigned(200))
    }

    async fn run(client: &mut StubClient, entries: &[Entry]) -> Metric {
        let mut names: HashMap<String, String> = HashMap::new();
        let mut metric = Metric::new();
        join_entries(client, true, &mut metric, entries, |m, entry, pdu| {
            let pool = crate::snmp::index::last_components(&pdu.oid, 2);
            match entry.oid {
                NAME => {
                    names.insert(pool, pdu.value.as_text().unwrap_or_default().to_lowercase());
                }
                _ => {
                    let name = names.get(&pool).cloned().unwrap_or_default();
                    m.add_field(
                        pool,
                        format!("memory_{name}_{}", entry.name),
                        pdu.value.as_i64().unwrap_or_default(),
                    );
                }
            }
        })
        .await;
        metric
    }

    #[tokio::test]
    async fn test_join_is_deterministic() {
        let first = run(&mut pool_client(), &ENTRIES).await;
        let second = run(&mut pool_client(), &ENTRIES).await;
        assert_eq!(first, second);
        assert_eq!(
            first.field("1.1", "memory_processor_used_bytes"),
            Some(&FieldValue::Integer(1000))
        );
        assert_eq!(
            first.field("1.2", "memory_io_used_bytes"),
            Some(&FieldValue::Integer(200))
        );
    }

    #[tokio::test]
    async fn test_reversed_entry_order_changes_result() {
        let ordered = run(&mut pool_client(), &ENTRIES).await;
        let reversed = run(&mut pool_client(), &[ENTRIES[1], ENTRIES[0]]).await;
        assert_ne!(ordered, reversed);
        // The side table is empty when the counters arrive first.
        assert!(reversed.field("1.1", "memory__used_bytes").is_some());
    }

    #[tokio::test]
    async fn test_entries_walked_in_declared_order() {
        let mut client = pool_client();
        let log = client.log();
        let _ = run(&mut client, &ENTRIES).await;
        assert_eq!(
            log.lock().unwrap().clone(),
            vec![format!("walk {NAME}"), format!("walk {USED}")]
        );
    }

    #[tokio::test]
    async fn test_failed_walk_skips_only_that_entry() {
        let mut client = pool_client().failing(NAME);
        let metric = run(&mut client, &ENTRIES).await;
        assert!(metric.field("1.1", "memory__used_bytes").is_some());
    }

    #[tokio::test]
    async fn test_builtin_joins() {
        let descr = ".1.3.6.1.2.1.2.2.1.2";
        let errors = ".1.3.6.1.2.1.2.2.1.14";
        let mut client = StubClient::new()
            .with(&format!("{descr}.3"), SnmpValue::OctetString(b"eth0".to_vec()))
            .with(&format!("{errors}.3"), SnmpValue::Counter64(9))
            .with(&format!("{errors}.4"), SnmpValue::Null);

        let mut data = Data::new();
        data.add_from_entries(&mut client, false, "interface_info", &[Entry::new("interface_descr", descr)], add_tags)
            .await;
        data.add_from_entries(&mut client, false, "interface_info", &[Entry::new("interface_in_errors", errors)], add_fields)
            .await;

        let metric = data.metric("interface_info").unwrap();
        assert_eq!(metric.tag("3", "interface_descr"), Some("eth0"));
        assert_eq!(metric.field("3", "interface_in_errors"), Some(&FieldValue::Integer(9)));
        assert!(metric.fields.get("4").is_none());
    }
}
