//! Meinberg LANTIME time server adapter.

use crate::data::{self, Entry, Metric};
use crate::snmp::Pdu;
use crate::snmp::index::component_from_end;

use super::{Adapter, Device, DeviceKind, Feature, ucd};

const NTP: [Entry; 8] = [
    Entry::new("ntp_stratum", ".1.3.6.1.4.1.5597.30.0.2.2"),
    Entry::new("ntp_clock_offset", ".1.3.6.1.4.1.5597.30.0.2.4"),
    Entry::new("ntp_frequency", ".1.3.6.1.4.1.5597.30.0.4.1.0"),
    Entry::new("ntp_pzf_correlation", ".1.3.6.1.4.1.5597.30.0.1.2.1.6.1"),
    Entry::new("ntp_field_strength", ".1.3.6.1.4.1.5597.30.0.1.2.1.8.1"),
    Entry::new("ntp_requests_current_day", ".1.3.6.1.4.1.5597.30.0.2.8.5"),
    Entry::new("ntp_requests_last_minute", ".1.3.6.1.4.1.5597.30.0.2.8.7"),
    Entry::new("ntp_clients", ".1.3.6.1.4.1.5597.30.0.2.8.8"),
];

const POWER: [Entry; 1] = [Entry::new("sensor_status", ".1.3.6.1.4.1.5597.30.0.5.0.2.1.2")];

const FAN: [Entry; 2] = [
    Entry::new("sensor_status", ".1.3.6.1.4.1.5597.30.0.5.1.2.1.2"),
    Entry::new("sensor_error", ".1.3.6.1.4.1.5597.30.0.5.1.2.1.3"),
];

const TEMPERATURE: [Entry; 1] = [Entry::new("sensor_value_celsius", ".1.3.6.1.4.1.5597.30.0.5.2.1")];

/// Row `group.unit` (0 = power supplies, 1 = fans), labelled `"{label} {unit}"`.
fn labelled(label: &'static str) -> impl FnMut(&mut Metric, &Entry, &Pdu) + Send {
    move |m, entry, pdu| {
        let unit = component_from_end(&pdu.oid, 1);
        let index = format!("{}.{unit}", component_from_end(&pdu.oid, 5));
        m.add_tag(&*index, "sensor_descr", format!("{label} {unit}"));
        if let Some(value) = pdu.value.to_field() {
            m.add_field(index, entry.name, value);
        }
    }
}

/// The NTP objects describe the one local server; scalars and fixed
/// table instances all land in row `"0"`.
fn ntp_status(m: &mut Metric, entry: &Entry, pdu: &Pdu) {
    if let Some(value) = pdu.value.to_field() {
        m.add_field("0", entry.name, value);
    }
}

#[derive(Debug, Default)]
pub(crate) struct Meinberg;

#[async_trait::async_trait]
impl Adapter for Meinberg {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Meinberg
    }

    fn supported(&self) -> &'static [Feature] {
        DeviceKind::Meinberg.supported()
    }

    async fn memory(&mut self, device: &mut Device) {
        ucd::memory_swap_and_real(device).await;
    }

    async fn cpu(&mut self, device: &mut Device) {
        ucd::cpu(device).await;
    }

    async fn sensors(&mut self, device: &mut Device) {
        device.add_from_entries(data::SENSOR, &POWER, labelled("Power Supply")).await;
        device.add_from_entries(data::SENSOR, &FAN, labelled("Fan")).await;
        device
            .add_from_entries(data::SENSOR, &TEMPERATURE, |m, entry, pdu| {
                if let Some(value) = pdu.value.as_f64() {
                    m.add_tag("", "sensor_descr", "Temperature");
                    m.add_field("", entry.name, value);
                }
            })
            .await;
    }

    async fn ntp(&mut self, device: &mut Device) {
        device.add_from_entries(data::NTP, &NTP, ntp_status).await;
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
    async fn test_time_server_collectors() {
        let agent = StubClient::new()
            .with(".1.3.6.1.2.1.1.5.0", SnmpValue::OctetString(b"ntp1".to_vec()))
            .with(".1.3.6.1.4.1.5597.30.0.2.2.0", SnmpValue::Integer(1))
            .with(".1.3.6.1.4.1.5597.30.0.2.8.8.0", SnmpValue::Unsigned(812))
            .with(".1.3.6.1.4.1.5597.30.0.5.0.2.1.2.1", SnmpValue::Integer(2))
            .with(".1.3.6.1.4.1.5597.30.0.5.1.2.1.3.2", SnmpValue::Integer(0))
            .with(".1.3.6.1.4.1.5597.30.0.5.2.1.0", SnmpValue::Unsigned(44))
            .with(".1.3.6.1.4.1.2021.4.3.0", SnmpValue::Integer(2048));
        let connector = StubConnector::new().with_agent("192.0.2.123", agent);
        let host = HostConfig::new("192.0.2.123".parse().unwrap(), "ntp").with_features(Features::all());
        let data = fetch(&host, &connector, &CancellationToken::new()).await;

        let ntp = data.metric(data::NTP).unwrap();
        assert_eq!(ntp.field("0", "ntp_stratum"), Some(&FieldValue::Integer(1)));
        assert_eq!(ntp.field("0", "ntp_clients"), Some(&FieldValue::Integer(812)));

        let sensors = data.metric(data::SENSOR).unwrap();
        assert_eq!(sensors.tag("0.1", "sensor_descr"), Some("Power Supply 1"));
        assert_eq!(sensors.field("0.1", "sensor_status"), Some(&FieldValue::Integer(2)));
        assert_eq!(sensors.tag("1.2", "sensor_descr"), Some("Fan 2"));
        assert_eq!(sensors.tag("", "sensor_descr"), Some("Temperature"));
        assert_eq!(sensors.field("", "sensor_value_celsius"), Some(&FieldValue::Float(44.0)));

        let memory = data.metric(data::MEMORY).unwrap();
        assert_eq!(memory.field("0", "memory_swap_used_kbytes"), Some(&FieldValue::Integer(2048)));
        assert_eq!(data.tag("device_type"), Some("ntp"));
    }

    #[tokio::test]
    async fn test_ntp_status_is_one_row() {
        let agent = StubClient::new()
            .with(".1.3.6.1.2.1.1.5.0", SnmpValue::OctetString(b"ntp2".to_vec()))
            .with(".1.3.6.1.4.1.5597.30.0.2.2.0", SnmpValue::Integer(2))
            .with(".1.3.6.1.4.1.5597.30.0.4.1.0", SnmpValue::Integer(-12))
            .with(".1.3.6.1.4.1.5597.30.0.1.2.1.6.1", SnmpValue::Integer(97))
            .with(".1.3.6.1.4.1.5597.30.0.1.2.1.8.1", SnmpValue::Integer(55));
        let connector = StubConnector::new().with_agent("192.0.2.124", agent);
        let host = HostConfig::new("192.0.2.124".parse().unwrap(), "meinberg")
            .with_features(Features::only(&[Feature::Ntp]));
        let data = fetch(&host, &connector, &CancellationToken::new()).await;

        let ntp = data.metric(data::NTP).unwrap();
        assert_eq!(ntp.fields.keys().collect::<Vec<_>>(), ["0"]);
        let row = &ntp.fields["0"];
        assert_eq!(row.len(), 4);
        assert_eq!(row["ntp_stratum"], FieldValue::Integer(2));
        assert_eq!(row["ntp_frequency"], FieldValue::Integer(-12));
        assert_eq!(row["ntp_pzf_correlation"], FieldValue::Integer(97));
        assert_eq!(row["ntp_field_strength"], FieldValue::Integer(55));
    }
}
