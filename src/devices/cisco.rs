//! Collectors shared by the IOS and IOS-XR adapters.

use std::collections::HashMap;

use crate::data::{self, Entry, Metric};
use crate::snmp::Pdu;
use crate::snmp::index::{component_from_end, last_components, table_index};

use super::Device;
use super::inventory::Inventory;

const CEMP_MEM_POOL_NAME: &str = ".1.3.6.1.4.1.9.9.221.1.1.1.1.3";

const CPM_CPU_TOTAL_PHYSICAL_INDEX: &str = ".1.3.6.1.4.1.9.9.109.1.1.1.1.2";

const CPU: [Entry; 3] = [
    Entry::new("index", CPM_CPU_TOTAL_PHYSICAL_INDEX),
    Entry::new("cpu_one_minute_percent", ".1.3.6.1.4.1.9.9.109.1.1.1.1.7"),
    Entry::new("cpu_five_minutes_percent", ".1.3.6.1.4.1.9.9.109.1.1.1.1.8"),
];

const ENT_SENSOR_TYPE: &str = ".1.3.6.1.4.1.9.9.91.1.1.1.1.1";
const ENT_SENSOR_SCALE: &str = ".1.3.6.1.4.1.9.9.91.1.1.1.1.2";
const ENT_SENSOR_PRECISION: &str = ".1.3.6.1.4.1.9.9.91.1.1.1.1.3";
const ENT_SENSOR_VALUE: &str = ".1.3.6.1.4.1.9.9.91.1.1.1.1.4";

const ENTITY_SENSORS: [Entry; 4] = [
    Entry::new("type", ENT_SENSOR_TYPE),
    Entry::new("scale", ENT_SENSOR_SCALE),
    Entry::new("precision", ENT_SENSOR_PRECISION),
    Entry::new("sensor_value", ENT_SENSOR_VALUE),
];

/// Unit suffix for an entSensorType value.
fn sensor_unit(kind: i64) -> &'static str {
    match kind {
        3 | 4 => "volts",
        5 => "amperes",
        6 => "watts",
        7 => "hertz",
        8 => "celsius",
        9 => "percent_rh",
        10 => "rpm",
        11 => "cmm",
        12 => "bool",
        13 => "special_enum",
        14 => "dbm",
        15 => "db",
        _ => "",
    }
}

/// Apply entSensorScale (SI prefix, 9 = units) and entSensorPrecision.
fn scaled(raw: i64, scale: i64, precision: i64) -> f64 {
    let exponent = (scale - 9) * 3 - precision;
    raw as f64 * 10f64.powi(exponent as i32)
}

/// Memory pools from CISCO-ENHANCED-MEMPOOL-MIB.
///
/// Rows are keyed by physical entity; each pool contributes
/// `memory_{pool}_used_bytes` and `memory_{pool}_free_bytes`.
pub(crate) async fn memory_pools(
    device: &mut Device,
    inventory: &Inventory,
    used_oid: &'static str,
    free_oid: &'static str,
) {
    let entries = [
        Entry::new("name", CEMP_MEM_POOL_NAME),
        Entry::new("used_bytes", used_oid),
        Entry::new("free_bytes", free_oid),
    ];
    let mut names: HashMap<String, String> = HashMap::new();

    device
        .add_from_entries(data::MEMORY, &entries, |m, entry, pdu| {
            let index = component_from_end(&pdu.oid, 2);
            let pool = last_components(&pdu.oid, 2);
            if entry.oid == CEMP_MEM_POOL_NAME {
                names.insert(pool, pdu.value.as_text().unwrap_or_default().to_lowercase());
                inventory.tag_row(m, index, index, "memory");
                return;
            }
            let name = names.get(&pool).map(String::as_str).unwrap_or_default();
            if let Some(value) = pdu.value.to_field() {
                m.add_field(index, format!("memory_{name}_{}", entry.name), value);
            }
        })
        .await;
}

/// CPU load from CISCO-PROCESS-MIB, tagged with the owning entity.
pub(crate) async fn cpu(device: &mut Device, inventory: &Inventory) {
    device
        .add_from_entries(data::CPU, &CPU, |m, entry, pdu| {
            let index = table_index(&pdu.oid, entry.oid);
            if entry.oid == CPM_CPU_TOTAL_PHYSICAL_INDEX {
                if let Some(physical) = pdu.value.as_i64() {
                    inventory.tag_row(m, &index, &physical.to_string(), "cpu");
                }
                return;
            }
            if let Some(value) = pdu.value.to_field() {
                m.add_field(index, entry.name, value);
            }
        })
        .await;
}

#[derive(Debug, Default)]
struct SensorScaling {
    units: HashMap<String, &'static str>,
    scales: HashMap<String, i64>,
    precisions: HashMap<String, i64>,
}

impl SensorScaling {
    fn join(&mut self, inventory: &Inventory, m: &mut Metric, entry: &Entry, pdu: &Pdu) {
        let index = table_index(&pdu.oid, entry.oid);
        let Some(raw) = pdu.value.as_i64() else {
            return;
        };
        match entry.oid {
            ENT_SENSOR_TYPE => {
                self.units.insert(index, sensor_unit(raw));
            }
            ENT_SENSOR_SCALE => {
                self.scales.insert(index, raw);
            }
            ENT_SENSOR_PRECISION => {
                self.precisions.insert(index, raw);
            }
            _ => {
                let unit = self.units.get(&index).copied().unwrap_or_default();
                let name = if unit.is_empty() {
                    entry.name.to_string()
                } else {
                    format!("{}_{unit}", entry.name)
                };
                if unit == "bool" {
                    m.add_field(&*index, name, raw == 1);
                } else {
                    let scale = self.scales.get(&index).copied().unwrap_or(9);
                    let precision = self.precisions.get(&index).copied().unwrap_or(0);
                    m.add_field(&*index, name, scaled(raw, scale, precision));
                }
                m.add_tag(&*index, "sensor_descr", inventory.label(&index));
            }
        }
    }
}

/// Entity sensors from CISCO-ENTITY-SENSOR-MIB, labelled from the inventory.
pub(crate) async fn entity_sensors(device: &mut Device, inventory: &Inventory) {
    let mut scaling = SensorScaling::default();
    device
        .add_from_entries(data::SENSOR, &ENTITY_SENSORS, |m, entry, pdu| {
            scaling.join(inventory, m, entry, pdu);
        })
        .await;
}
