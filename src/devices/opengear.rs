//! Opengear console server adapter.

use crate::data::{self, Entry, add_fields, add_tags};

use super::{Adapter, Device, DeviceKind, Feature, ucd};

const CELL_INFO: [Entry; 11] = [
    Entry::new("cell_modem_enabled", ".1.3.6.1.4.1.25049.17.17.1.4.1"),
    Entry::new("cell_modem_connected", ".1.3.6.1.4.1.25049.17.17.1.5.1"),
    Entry::new("cell_modem_registered", ".1.3.6.1.4.1.25049.17.17.1.7.1"),
    Entry::new("cell_modem_tower", ".1.3.6.1.4.1.25049.17.17.1.8.1"),
    Entry::new("cell_modem_tech", ".1.3.6.1.4.1.25049.17.17.1.9.1"),
    Entry::new("cell_modem_3g_rssi", ".1.3.6.1.4.1.25049.17.17.1.11.1"),
    Entry::new("cell_modem_4g_rssi", ".1.3.6.1.4.1.25049.17.17.1.12.1"),
    Entry::new("cell_modem_session_time", ".1.3.6.1.4.1.25049.17.17.1.13.1"),
    Entry::new("cell_modem_sim_card", ".1.3.6.1.4.1.25049.17.17.1.14.1"),
    Entry::new("cell_modem_temperature", ".1.3.6.1.4.1.25049.17.17.1.15.1"),
    Entry::new("cell_modem_counter", ".1.3.6.1.4.1.25049.17.17.1.16.1"),
];

const OG_EMD_TEMPERATURE_VALUE: &str = ".1.3.6.1.4.1.25049.17.9.1.5";

const SENSORS: [Entry; 3] = [
    Entry::new("sensor_name", ".1.3.6.1.4.1.25049.17.9.1.3"),
    Entry::new("sensor_descr", ".1.3.6.1.4.1.25049.17.9.1.4"),
    Entry::new("sensor_value_celsius", OG_EMD_TEMPERATURE_VALUE),
];

#[derive(Debug, Default)]
pub(crate) struct Opengear;

#[async_trait::async_trait]
impl Adapter for Opengear {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Opengear
    }

    fn bulk(&self) -> bool {
        true
    }

    fn supported(&self) -> &'static [Feature] {
        DeviceKind::Opengear.supported()
    }

    async fn cell_info(&mut self, device: &mut Device) {
        device.add_fields(data::CELL, &CELL_INFO).await;
    }

    async fn memory(&mut self, device: &mut Device) {
        ucd::memory_totals(device).await;
    }

    async fn cpu(&mut self, device: &mut Device) {
        ucd::cpu(device).await;
    }

    async fn sensors(&mut self, device: &mut Device) {
        device
            .add_from_entries(data::SENSOR, &SENSORS, |m, entry, pdu| {
                if entry.oid == OG_EMD_TEMPERATURE_VALUE {
                    add_fields(m, entry, pdu);
                } else {
                    add_tags(m, entry, pdu);
                }
            })
            .await;
    }
}
