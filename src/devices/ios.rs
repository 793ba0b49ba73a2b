//! Cisco IOS adapter.

use std::collections::HashMap;

use crate::data::{self, Entry, Metric};
use crate::snmp::Pdu;
use crate::snmp::index::{component_from_end, last_components, suffix};

use super::inventory::{self, Inventory};
use super::{Adapter, Device, DeviceKind, Feature, cisco};

const CCAR_CONFIG_ACC_IDX: &str = ".1.3.6.1.4.1.9.9.113.1.1.1.1.4";

const NETWORK_ACL: [Entry; 3] = [
    Entry::new("acc_index", CCAR_CONFIG_ACC_IDX),
    Entry::new("permit_bytes", ".1.3.6.1.4.1.9.9.113.1.2.1.1.11"),
    Entry::new("drop_bytes", ".1.3.6.1.4.1.9.9.113.1.2.1.1.13"),
];

const BGP_PEERS: [Entry; 3] = [
    Entry::new("bgp_accepted_prefixes", ".1.3.6.1.4.1.9.9.187.1.2.4.1.1"),
    Entry::new("bgp_denied_prefixes", ".1.3.6.1.4.1.9.9.187.1.2.4.1.2"),
    Entry::new("bgp_limit_prefixes", ".1.3.6.1.4.1.9.9.187.1.2.4.1.3"),
];

const VOLTAGE_DESCR: &str = ".1.3.6.1.4.1.9.9.13.1.2.1.2";
const VOLTAGE_STATE: &str = ".1.3.6.1.4.1.9.9.13.1.2.1.7";

const VOLTAGE: [Entry; 5] = [
    Entry::new("sensor_descr", VOLTAGE_DESCR),
    Entry::new("sensor_value", ".1.3.6.1.4.1.9.9.13.1.2.1.3"),
    Entry::new("sensor_thresh_low", ".1.3.6.1.4.1.9.9.13.1.2.1.4"),
    Entry::new("sensor_thresh_high", ".1.3.6.1.4.1.9.9.13.1.2.1.5"),
    Entry::new("sensor_state", VOLTAGE_STATE),
];

const TEMPERATURE: [Entry; 4] = [
    Entry::new("sensor_descr", ".1.3.6.1.4.1.9.9.13.1.3.1.2"),
    Entry::new("sensor_value_celsius", ".1.3.6.1.4.1.9.9.13.1.3.1.3"),
    Entry::new("sensor_thresh_celsius", ".1.3.6.1.4.1.9.9.13.1.3.1.4"),
    Entry::new("sensor_state", ".1.3.6.1.4.1.9.9.13.1.3.1.6"),
];

const FAN: [Entry; 2] = [
    Entry::new("sensor_descr", ".1.3.6.1.4.1.9.9.13.1.4.1.2"),
    Entry::new("sensor_state", ".1.3.6.1.4.1.9.9.13.1.4.1.3"),
];

const SUPPLY: [Entry; 2] = [
    Entry::new("sensor_descr", ".1.3.6.1.4.1.9.9.13.1.5.1.2"),
    Entry::new("sensor_state", ".1.3.6.1.4.1.9.9.13.1.5.1.3"),
];

const MILLIVOLTS: &str = "(in mV)";

/// Envmon rows carry the table number so rows of different tables never merge.
fn envmon_index(oid: &str) -> String {
    format!("{}.{}", component_from_end(oid, 4), component_from_end(oid, 1))
}

/// Per-row unit learned from the voltage description.
#[derive(Debug, Default)]
struct VoltageUnits {
    millis: HashMap<String, bool>,
    units: HashMap<String, &'static str>,
}

impl VoltageUnits {
    fn join(&mut self, m: &mut Metric, entry: &Entry, pdu: &Pdu) {
        let index = envmon_index(&pdu.oid);
        if entry.oid == VOLTAGE_DESCR {
            let descr = pdu.value.as_text().unwrap_or_default();
            let (descr, millis) = match descr.find(MILLIVOLTS) {
                Some(at) => (descr[..at].trim_end().to_string(), true),
                None => (descr, false),
            };
            let unit = if descr.contains("amps") { "amperes" } else { "volts" };
            self.millis.insert(index.clone(), millis);
            self.units.insert(index.clone(), unit);
            m.add_tag(index, entry.name, descr);
            return;
        }
        if entry.oid == VOLTAGE_STATE {
            if let Some(value) = pdu.value.to_field() {
                m.add_field(index, entry.name, value);
            }
            return;
        }
        let Some(raw) = pdu.value.as_f64() else {
            return;
        };
        let value = if self.millis.get(&index).copied().unwrap_or(false) {
            raw / 1000.0
        } else {
            raw
        };
        let unit = self.units.get(&index).copied().unwrap_or("volts");
        m.add_field(index, format!("{}_{unit}", entry.name), value);
    }
}

/// Temperature, fan and supply rows: description tag, raw state, float readings.
fn envmon_join(m: &mut Metric, entry: &Entry, pdu: &Pdu) {
    let index = envmon_index(&pdu.oid);
    match entry.name {
        "sensor_descr" => {
            if let Some(descr) = pdu.value.as_text() {
                m.add_tag(index, entry.name, descr);
            }
        }
        "sensor_state" => {
            if let Some(value) = pdu.value.to_field() {
                m.add_field(index, entry.name, value);
            }
        }
        _ => {
            if let Some(value) = pdu.value.as_f64() {
                m.add_field(index, entry.name, value);
            }
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CiscoIos {
    inventory: Inventory,
}

#[async_trait::async_trait]
impl Adapter for CiscoIos {
    fn kind(&self) -> DeviceKind {
        DeviceKind::CiscoIos
    }

    fn bulk(&self) -> bool {
        true
    }

    fn supported(&self) -> &'static [Feature] {
        DeviceKind::CiscoIos.supported()
    }

    async fn init(&mut self, device: &mut Device) {
        let features = device.features();
        if features.memory || features.cpu || features.sensors {
            self.inventory = Inventory::load(device).await;
        }
    }

    async fn network_acl(&mut self, device: &mut Device) {
        let mut acls: HashMap<String, String> = HashMap::new();
        device
            .add_from_entries(data::INTERFACE, &NETWORK_ACL, |m, entry, pdu| {
                let acc_index = last_components(&pdu.oid, 3);
                if entry.oid == CCAR_CONFIG_ACC_IDX {
                    if let Some(acl) = pdu.value.as_i64() {
                        acls.insert(acc_index, acl.to_string());
                    }
                    return;
                }
                let index = component_from_end(&pdu.oid, 3);
                let direction = match component_from_end(&pdu.oid, 2) {
                    "1" => "in",
                    "2" => "out",
                    _ => return,
                };
                let acl = acls.get(&acc_index).map(String::as_str).unwrap_or_default();
                if let Some(value) = pdu.value.to_field() {
                    m.add_field(index, format!("interface_{direction}_acl_{acl}_{}", entry.name), value);
                }
            })
            .await;
    }

    async fn bgp_peers(&mut self, device: &mut Device) {
        device
            .add_from_entries(data::BGP, &BGP_PEERS, |m, entry, pdu| {
                let Some(rest) = suffix(&pdu.oid, entry.oid) else {
                    return;
                };
                let parts: Vec<&str> = rest.split('.').collect();
                if parts.len() < 4 {
                    return;
                }
                let peer = parts[..4].join(".");
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
            ".1.3.6.1.4.1.9.9.221.1.1.1.1.7",
            ".1.3.6.1.4.1.9.9.221.1.1.1.1.8",
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
        let mut voltage = VoltageUnits::default();
        device
            .add_from_entries(data::SENSOR, &VOLTAGE, |m, entry, pdu| voltage.join(m, entry, pdu))
            .await;
        device.add_from_entries(data::SENSOR, &TEMPERATURE, envmon_join).await;
        device.add_from_entries(data::SENSOR, &FAN, envmon_join).await;
        device.add_from_entries(data::SENSOR, &SUPPLY, envmon_join).await;

        if inventory::missing(&self.inventory, device, "entity sensors") {
            return;
        }
        cisco::entity_sensors(device, &self.inventory).await;
    }
}
