//! MRV/Lantronix LX console server adapter.

use crate::data::{self, Entry};
use crate::snmp::index::table_index;

use super::{Adapter, Device, DeviceKind, Feature};

const CELL_INFO: [Entry; 2] = [
    Entry::new("cell_signal_strength", ".1.3.6.1.4.1.33.100.2.13.1.2"),
    Entry::new("cell_bit_error_rate", ".1.3.6.1.4.1.33.100.2.13.1.3"),
];

const IR_POWER_INPUT_STATUS: &str = ".1.3.6.1.4.1.33.100.1.6.1.1.3";
const IR_POWER_OUTPUT_STATUS: &str = ".1.3.6.1.4.1.33.100.1.6.1.1.4";

const SENSORS: [Entry; 5] = [
    Entry::new("sensor_value_celsius", ".1.3.6.1.4.1.33.100.1.1.14"),
    Entry::new("sensor_thresh_low_celsius", ".1.3.6.1.4.1.33.100.1.1.15"),
    Entry::new("sensor_thresh_high_celsius", ".1.3.6.1.4.1.33.100.1.1.16"),
    Entry::new("sensor_input_status_bool", IR_POWER_INPUT_STATUS),
    Entry::new("sensor_output_status_bool", IR_POWER_OUTPUT_STATUS),
];

#[derive(Debug, Default)]
pub(crate) struct Mrv;

#[async_trait::async_trait]
impl Adapter for Mrv {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Mrv
    }

    fn supported(&self) -> &'static [Feature] {
        DeviceKind::Mrv.supported()
    }

    async fn cell_info(&mut self, device: &mut Device) {
        device.add_fields(data::CELL, &CELL_INFO).await;
    }

    async fn sensors(&mut self, device: &mut Device) {
        device
            .add_from_entries(data::SENSOR, &SENSORS, |m, entry, pdu| {
                let index = table_index(&pdu.oid, entry.oid);
                m.add_tag(&*index, "sensor_index", &*index);
                match entry.oid {
                    IR_POWER_INPUT_STATUS | IR_POWER_OUTPUT_STATUS => {
                        if let Some(status) = pdu.value.as_i64() {
                            m.add_field(index, entry.name, status == 1);
                        }
                    }
                    _ => {
                        if let Some(value) = pdu.value.to_field() {
                            m.add_field(index, entry.name, value);
                        }
                    }
                }
            })
            .await;
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

    #[tokio::test]
    async fn test_power_status_is_boolean() {
        let agent = StubClient::new()
            .with(".1.3.6.1.2.1.1.5.0", SnmpValue::OctetString(b"lx-01".to_vec()))
            .with(".1.3.6.1.4.1.33.100.1.1.14.0", SnmpValue::Integer(38))
            .with(".1.3.6.1.4.1.33.100.1.6.1.1.3.1", SnmpValue::Integer(1))
            .with(".1.3.6.1.4.1.33.100.1.6.1.1.3.2", SnmpValue::Integer(2));
        let log = agent.log();
        let connector = StubConnector::new().with_agent("203.0.113.8", agent);
        let host = HostConfig::new("203.0.113.8".parse().unwrap(), "MRV")
            .with_features(Features::only(&[Feature::Sensors, Feature::Memory]));
        let data = fetch(&host, &connector, &CancellationToken::new()).await;

        let sensors = data.metric(data::SENSOR).unwrap();
        assert_eq!(sensors.tag("0", "sensor_index"), Some("0"));
        assert_eq!(sensors.field("0", "sensor_value_celsius"), Some(&FieldValue::Integer(38)));
        assert_eq!(sensors.field("1", "sensor_input_status_bool"), Some(&FieldValue::Boolean(true)));
        assert_eq!(sensors.field("2", "sensor_input_status_bool"), Some(&FieldValue::Boolean(false)));

        // Memory is unsupported on this family and never walked.
        assert!(!log.lock().unwrap().iter().any(|c| c.contains("2021.4")));
    }
}
