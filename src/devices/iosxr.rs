//! Cisco IOS-XR adapter.

use std::collections::HashMap;

use crate::data::{self, Entry, Metric};
use crate::snmp::Pdu;
use crate::snmp::index::{ipv6_from_octets, suffix};

use super::inventory::{self, Inventory};
use super::{Adapter, Device, DeviceKind, Feature, cisco};

const IPV6_COUNTERS: [Entry; 4] = [
    Entry::new("interface_in_ipv6_uni_bytes", ".1.3.6.1.2.1.4.31.3.1.6"),
    Entry::new("interface_in_ipv6_multi_bytes", ".1.3.6.1.2.1.4.31.3.1.37"),
    Entry::new("interface_out_ipv6_uni_bytes", ".1.3.6.1.2.1.4.31.3.1.33"),
    Entry::new("interface_out_ipv6_multi_bytes", ".1.3.6.1.2.1.4.31.3.1.41"),
];

const CB_QOS_CM_NAME: &str = ".1.3.6.1.4.1.9.9.166.1.7.1.1.1";
const CB_QOS_POLICY_MAP_NAME: &str = ".1.3.6.1.4.1.9.9.166.1.6.1.1.1";
const CB_QOS_IF_POLICY_INDEX: &str = ".1.3.6.1.4.1.9.9.166.1.2.1.1.1";
const CB_QOS_CONFIG_INDEX: &str = ".1.3.6.1.4.1.9.9.166.1.5.1.1.2";
const CB_QOS_PARENT_OBJECTS_INDEX: &str = ".1.3.6.1.4.1.9.9.166.1.5.1.1.4";

const NETWORK_POLICY: [Entry; 7] = [
    Entry::new("cmname", CB_QOS_CM_NAME),
    Entry::new("pmname", CB_QOS_POLICY_MAP_NAME),
    Entry::new("policy", CB_QOS_IF_POLICY_INDEX),
    Entry::new("config", CB_QOS_CONFIG_INDEX),
    Entry::new("parent", CB_QOS_PARENT_OBJECTS_INDEX),
    Entry::new("permit_bytes", ".1.3.6.1.4.1.9.9.166.1.15.1.1.6"),
    Entry::new("drop_bytes", ".1.3.6.1.4.1.9.9.166.1.15.1.1.17"),
];

const BGP_PEERS: [Entry; 3] = [
    Entry::new("bgp_accepted_prefixes", ".1.3.6.1.4.1.9.9.187.1.2.8.1.1"),
    Entry::new("bgp_denied_prefixes", ".1.3.6.1.4.1.9.9.187.1.2.8.1.2"),
    Entry::new("bgp_limit_prefixes", ".1.3.6.1.4.1.9.9.187.1.2.8.1.3"),
];

/// Side tables of CISCO-CLASS-BASED-QOS-MIB, filled in walk order.
#[derive(Debug, Default)]
struct QosTables {
    class_maps: HashMap<String, String>,
    policy_maps: HashMap<String, String>,
    /// policy index -> "ifIndex.direction"
    interfaces: HashMap<String, String>,
    /// object index -> config index
    configs: HashMap<String, String>,
    /// object index -> parent object index
    parents: HashMap<String, String>,
}

fn lookup<'a>(map: &'a HashMap<String, String>, key: &str) -> &'a str {
    map.get(key).map(String::as_str).unwrap_or_default()
}

impl QosTables {
    fn join(&mut self, m: &mut Metric, entry: &Entry, pdu: &Pdu) {
        let Some(index) = suffix(&pdu.oid, entry.oid) else {
            return;
        };
        match entry.oid {
            CB_QOS_CM_NAME => {
                self.class_maps
                    .insert(index.to_string(), pdu.value.as_text().unwrap_or_default());
                return;
            }
            CB_QOS_POLICY_MAP_NAME => {
                self.policy_maps
                    .insert(index.to_string(), pdu.value.as_text().unwrap_or_default());
                return;
            }
            _ => {}
        }

        let Some((policy, object)) = index.split_once('.') else {
            return;
        };
        let number = || pdu.value.as_i64().map(|v| v.to_string()).unwrap_or_default();
        match entry.oid {
            CB_QOS_IF_POLICY_INDEX => {
                self.interfaces.insert(number(), index.to_string());
            }
            CB_QOS_CONFIG_INDEX => {
                self.configs.insert(object.to_string(), number());
            }
            CB_QOS_PARENT_OBJECTS_INDEX => {
                self.parents.insert(object.to_string(), number());
            }
            _ => self.counter(m, entry, pdu, policy, object),
        }
    }

    fn counter(&self, m: &mut Metric, entry: &Entry, pdu: &Pdu, policy: &str, object: &str) {
        let class = lookup(&self.class_maps, lookup(&self.configs, object)).to_lowercase();
        let Some((if_index, direction)) = lookup(&self.interfaces, policy).split_once('.') else {
            return;
        };
        let direction = match direction {
            "1" => "in",
            "2" => "out",
            _ => return,
        };

        let parent = lookup(&self.parents, object);
        let mut policy_name = lookup(&self.policy_maps, lookup(&self.configs, parent)).to_string();
        let grandparent = lookup(&self.parents, parent);
        if lookup(&self.parents, grandparent) != "0" {
            let class_of_grandparent = lookup(&self.class_maps, lookup(&self.configs, grandparent));
            if !class_of_grandparent.is_empty() {
                policy_name = format!("{policy_name}.{class_of_grandparent}");
            }
        }

        let row = format!("{if_index}_{parent}");
        if m.row_tags(&row).is_none() {
            if let Some(tags) = m.row_tags(if_index).cloned() {
                for (name, value) in tags {
                    m.add_tag(&*row, name, value);
                }
            }
        }
        m.add_tag(&*row, "interface_policy_parent", policy_name);
        if let Some(value) = pdu.value.to_field() {
            m.add_field(row, format!("interface_{direction}_{class}_{}", entry.name), value);
        }
    }
}

/// Peer address from a cbgpPeer2 row suffix: `type.length.octets...`.
fn peer_address(rest: &str) -> Option<String> {
    let parts: Vec<&str> = rest.split('.').collect();
    let kind = *parts.first()?;
    let size: usize = parts.get(1)?.parse().ok()?;
    let octets = parts.get(2..2 + size)?;
    match kind {
        "1" => Some(octets.join(".")),
        "2" => ipv6_from_octets(octets),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub(crate) struct CiscoIosXr {
    inventory: Inventory,
}

#[async_trait::async_trait]
impl Adapter for CiscoIosXr {
    fn kind(&self) -> DeviceKind {
        DeviceKind::CiscoIosXr
    }

    fn bulk(&self) -> bool {
        true
    }

    fn supported(&self) -> &'static [Feature] {
        DeviceKind::CiscoIosXr.supported()
    }

    async fn init(&mut self, device: &mut Device) {
        let features = *device.features();
        if features.memory || features.cpu || features.sensors {
            self.inventory = Inventory::load(device).await;
        }
    }

    async fn interface_counters(&mut self, device: &mut Device) {
        device.interface_counters().await;
        device
            .add_from_entries(data::INTERFACE, &IPV6_COUNTERS, |m, entry, pdu| {
                let Some(index) = suffix(&pdu.oid, entry.oid).and_then(|s| s.strip_prefix("2.")) else {
                    return;
                };
                if let Some(value) = pdu.value.to_field() {
                    m.add_field(index, entry.name, value);
                }
            })
            .await;
    }

    async fn network_policy(&mut self, device: &mut Device) {
        let mut tables = QosTables::default();
        device
            .add_from_entries(data::INTERFACE, &NETWORK_POLICY, |m, entry, pdu| tables.join(m, entry, pdu))
            .await;
    }

    async fn bgp_peers(&mut self, device: &mut Device) {
        device
            .add_from_entries(data::BGP, &BGP_PEERS, |m, entry, pdu| {
                let Some(peer) = suffix(&pdu.oid, entry.oid).and_then(peer_address) else {
                    return;
                };
                if let Some(value) = pdu.value.to_field() {
                    m.add_field(&*peer, entry.name, value);
                }
                m.add_tag(&*peer, "bgp_neighbour", &*peer);
            })
            .await;
    }

    async fn memory(&mut self, device: &mut Device) {
        if inventory::missing(&self.inventory, device, "memory") {
            return;
        }
        cisco::memory_pools(
            device,
            &self.inventory,
            ".1.3.6.1.4.1.9.9.221.1.1.1.1.18",
            ".1.3.6.1.4.1.9.9.221.1.1.1.1.20",
        )
        .await;
    }

    async fn cpu(&mut self, device: &mut Device) {
        if inventory::missing(&self.inventory, device, "cpu") {
            return;
        }
        cisco::cpu(device, &self.inventory).await;
    }

    async fn sensors(&mut self, device: &mut Device) {
        if inventory::missing(&self.inventory, device, "sensors") {
            return;
        }
        cisco::entity_sensors(device, &self.inventory).await;
    }
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::config::HostConfig;
    use crate::data::FieldValue;
    use crate::devices::{Features, fetch};
    use crate::snmp::SnmpValue;
    use crate::snmp::testing::{StubClient, StubConnector};

    fn text(s: &str) -> SnmpValue {
        SnmpValue::OctetString(s.as_bytes().to_vec())
    }

    async fn collect(agent: StubClient, features: Features) -> crate::data::Data {
        let connector = StubConnector::new().with_agent("198.51.100.1", agent);
        let host = HostConfig::new("198.51.100.1".parse().unwrap(), "cisco-ios-xr").with_features(features);
        fetch(&host, &connector, &CancellationToken::new()).await
    }

    #[test]
    fn test_peer_address() {
        assert_eq!(peer_address("1.4.192.0.2.1.1.1").as_deref(), Some("192.0.2.1"));
        let v6 = "2.16.32.1.13.184.0.0.0.0.0.0.0.0.0.0.0.1.2.1";
        assert_eq!(peer_address(v6).as_deref(), Some("2001:db8::1"));
        assert_eq!(peer_address("1.4.10.0"), None);
        assert_eq!(peer_address("3.4.1.2.3.4"), None);
    }

    #[tokio::test]
    async fn test_ipv6_counters_join_interface_rows() {
        let agent = StubClient::new()
            .with(".1.3.6.1.2.1.1.5.0", text("pe1"))
            .with(".1.3.6.1.2.1.2.2.1.2.9", text("Gi0/0/0/1"))
            .with(".1.3.6.1.2.1.4.31.3.1.6.2.9", SnmpValue::Counter64(4096))
            .with(".1.3.6.1.2.1.4.31.3.1.6.1.9", SnmpValue::Counter64(1));
        let data = collect(agent, Features::only(&[Feature::InterfaceCounters])).await;

        let interfaces = data.metric(data::INTERFACE).unwrap();
        assert_eq!(interfaces.tag("9", "interface_descr"), Some("Gi0/0/0/1"));
        assert_eq!(
            interfaces.field("9", "interface_in_ipv6_uni_bytes"),
            Some(&FieldValue::Integer(4096))
        );
        assert_eq!(interfaces.fields.len(), 1);
    }

    #[tokio::test]
    async fn test_network_policy_rows() {
        // Interface 9 outbound runs policy 100. Object 300 is class "VOICE"
        // nested under object 200 (policy map "EDGE"), whose parent is 0.
        let agent = StubClient::new()
            .with(".1.3.6.1.2.1.1.5.0", text("pe1"))
            .with(".1.3.6.1.2.1.2.2.1.2.9", text("Gi0/0/0/1"))
            .with(&format!("{CB_QOS_CM_NAME}.1025"), text("VOICE"))
            .with(&format!("{CB_QOS_POLICY_MAP_NAME}.1024"), text("EDGE"))
            .with(&format!("{CB_QOS_IF_POLICY_INDEX}.9.2"), SnmpValue::Unsigned(100))
            .with(&format!("{CB_QOS_CONFIG_INDEX}.100.200"), SnmpValue::Unsigned(1024))
            .with(&format!("{CB_QOS_CONFIG_INDEX}.100.300"), SnmpValue::Unsigned(1025))
            .with(&format!("{CB_QOS_PARENT_OBJECTS_INDEX}.100.200"), SnmpValue::Unsigned(0))
            .with(&format!("{CB_QOS_PARENT_OBJECTS_INDEX}.100.300"), SnmpValue::Unsigned(200))
            .with(".1.3.6.1.4.1.9.9.166.1.15.1.1.6.100.300", SnmpValue::Counter64(5000))
            .with(".1.3.6.1.4.1.9.9.166.1.15.1.1.17.100.300", SnmpValue::Counter64(12));
        let data = collect(agent, Features::only(&[Feature::NetworkPolicy])).await;

        let interfaces = data.metric(data::INTERFACE).unwrap();
        assert_eq!(interfaces.tag("9_200", "interface_descr"), Some("Gi0/0/0/1"));
        assert_eq!(interfaces.tag("9_200", "interface_policy_parent"), Some("EDGE"));
        assert_eq!(
            interfaces.field("9_200", "interface_out_voice_permit_bytes"),
            Some(&FieldValue::Integer(5000))
        );
        assert_eq!(
            interfaces.field("9_200", "interface_out_voice_drop_bytes"),
            Some(&FieldValue::Integer(12))
        );
    }

    #[tokio::test]
    async fn test_sensors_skipped_without_inventory() {
        let agent = StubClient::new()
            .with(".1.3.6.1.2.1.1.5.0", text("pe1"))
            .with(".1.3.6.1.4.1.9.9.91.1.1.1.1.4.5", SnmpValue::Integer(30));
        let data = collect(agent, Features::only(&[Feature::Sensors])).await;
        assert!(data.metric(data::SENSOR).is_none());
    }
}
