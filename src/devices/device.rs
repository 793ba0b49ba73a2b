//! Shared device base and the per-host fetch loop.

use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::HostConfig;
use crate::data::{self, Data, Entry, Metric, add_fields, add_tags};
use crate::snmp::index::suffix;
use crate::snmp::{Connector, Pdu, WalkClient};

use super::{DeviceKind, Feature, Features};

const SYS_NAME: &str = ".1.3.6.1.2.1.1.5.0";

const IF_DESCR: &str = ".1.3.6.1.2.1.2.2.1.2";
const IF_NAME: &str = ".1.3.6.1.2.1.31.1.1.1.1";
const IF_ALIAS: &str = ".1.3.6.1.2.1.31.1.1.1.18";
const IP_AD_ENT_IF_INDEX: &str = ".1.3.6.1.2.1.4.20.1.2";

const SNMP_ENGINE_TIME: &str = ".1.3.6.1.6.3.10.2.1.3";

const INTERFACE_TAGS: [Entry; 4] = [
    Entry::new("interface_descr", IF_DESCR),
    Entry::new("interface_name", IF_NAME),
    Entry::new("interface_alias", IF_ALIAS),
    Entry::new("interface_addr", IP_AD_ENT_IF_INDEX),
];

const UPTIME: [Entry; 1] = [Entry::new("uptime_seconds", SNMP_ENGINE_TIME)];

const INTERFACE_COUNTERS: [Entry; 6] = [
    Entry::new("interface_in_discards", ".1.3.6.1.2.1.2.2.1.13"),
    Entry::new("interface_out_discards", ".1.3.6.1.2.1.2.2.1.19"),
    Entry::new("interface_in_errors", ".1.3.6.1.2.1.2.2.1.14"),
    Entry::new("interface_out_errors", ".1.3.6.1.2.1.2.2.1.20"),
    Entry::new("interface_in_hc_bytes", ".1.3.6.1.2.1.31.1.1.1.6"),
    Entry::new("interface_out_hc_bytes", ".1.3.6.1.2.1.31.1.1.1.10"),
];

/// Vendor-specific behaviour layered over [`Device`].
///
/// Collectors that a vendor does not override fall back to the shared
/// implementation (uptime, interface counters) or do nothing.
#[async_trait::async_trait]
pub trait Adapter: Send {
    fn kind(&self) -> DeviceKind;

    /// Whether table walks use GETBULK.
    fn bulk(&self) -> bool {
        false
    }

    /// Features this vendor can collect; everything else is switched off.
    fn supported(&self) -> &'static [Feature];

    /// Prefetch secondary tables after the identity probe succeeded.
    async fn init(&mut self, _device: &mut Device) {}

    async fn uptime(&mut self, device: &mut Device) {
        device.uptime().await;
    }

    async fn interface_counters(&mut self, device: &mut Device) {
        device.interface_counters().await;
    }

    async fn network_acl(&mut self, _device: &mut Device) {}

    async fn network_policy(&mut self, _device: &mut Device) {}

    async fn bgp_peers(&mut self, _device: &mut Device) {}

    async fn cell_info(&mut self, _device: &mut Device) {}

    async fn memory(&mut self, _device: &mut Device) {}

    async fn cpu(&mut self, _device: &mut Device) {}

    async fn sensors(&mut self, _device: &mut Device) {}

    async fn ntp(&mut self, _device: &mut Device) {}
}

/// A host being fetched: its transport, features and the record under
/// construction.
pub struct Device {
    pub(crate) client: Box<dyn WalkClient>,
    pub(crate) data: Data,
    pub(crate) features: Features,
    pub(crate) bulk: bool,
    address: String,
    type_tag: String,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("address", &self.address)
            .field("type", &self.type_tag)
            .field("features", &self.features)
            .field("bulk", &self.bulk)
            .finish_non_exhaustive()
    }
}

impl Device {
    pub fn new(host: &HostConfig, client: Box<dyn WalkClient>, features: Features, bulk: bool) -> Self {
        Self {
            client,
            data: Data::new(),
            features,
            bulk,
            address: host.ip.to_string(),
            type_tag: host.device_type.to_lowercase(),
        }
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Walk `entries` into `metric` through a custom join.
    pub async fn add_from_entries<F>(&mut self, metric: &str, entries: &[Entry], join: F)
    where
        F: FnMut(&mut Metric, &Entry, &Pdu) + Send,
    {
        self.data
            .add_from_entries(self.client.as_mut(), self.bulk, metric, entries, join)
            .await;
    }

    /// Walk `entries` into `metric`, one field per entry.
    pub async fn add_fields(&mut self, metric: &str, entries: &[Entry]) {
        self.add_from_entries(metric, entries, add_fields).await;
    }

    /// Walk `entries` into `metric`, one tag per entry.
    pub async fn add_tags(&mut self, metric: &str, entries: &[Entry]) {
        self.add_from_entries(metric, entries, add_tags).await;
    }

    /// Read sysName and tag the record with the device identity.
    ///
    /// Returns `false` when the agent did not answer; the record then only
    /// carries the address and type tags.
    pub async fn identify(&mut self) -> bool {
        let name = match self.client.get(&[SYS_NAME]).await {
            Ok(pdus) => pdus.first().and_then(|pdu| pdu.value.as_text()),
            Err(e) => {
                tracing::warn!(host = %self.address, error = %e, "Identity probe failed");
                None
            }
        };

        if let Some(name) = &name {
            self.data.add_tag("device_name", name.to_lowercase());
        }
        self.data.add_tag("device_ip", self.address.clone());
        self.data.add_tag("device_type", self.type_tag.clone());
        name.is_some()
    }

    /// Tag every interface row with its description, name, alias and
    /// addresses. Needed by interface counters and network policy.
    pub async fn interface_tags(&mut self) {
        if !self.features.interface_counters && !self.features.network_policy {
            return;
        }
        self.add_from_entries(data::INTERFACE, &INTERFACE_TAGS, |m, entry, pdu| {
            if entry.oid != IP_AD_ENT_IF_INDEX {
                add_tags(m, entry, pdu);
                return;
            }
            let (Some(if_index), Some(addr)) = (pdu.value.as_i64(), suffix(&pdu.oid, entry.oid))
            else {
                return;
            };
            let index = if_index.to_string();
            let tag = match m.tag(&index, entry.name) {
                Some(existing) if !existing.is_empty() => format!("{existing};{addr}"),
                _ => addr.to_string(),
            };
            m.add_tag(index, entry.name, tag);
        })
        .await;
    }

    pub async fn uptime(&mut self) {
        self.add_fields(data::UPTIME, &UPTIME).await;
    }

    pub async fn interface_counters(&mut self) {
        self.add_fields(data::INTERFACE, &INTERFACE_COUNTERS).await;
    }

    fn record_duration(&mut self, field: String, started: Instant) {
        if self.features.statistics {
            self.data
                .metric_mut(data::STATISTICS)
                .add_field("0", field, started.elapsed().as_secs_f64());
        }
    }

    /// Run identity, interface tags, vendor init and every enabled collector.
    ///
    /// Cancellation is observed between collectors only.
    async fn collect(&mut self, adapter: &mut dyn Adapter, cancel: &CancellationToken) {
        if !self.identify().await {
            tracing::info!(host = %self.address, "Fetch cancelled: device did not identify");
            return;
        }
        self.interface_tags().await;
        adapter.init(self).await;

        let enabled: Vec<Feature> = self.features.enabled().collect();
        for feature in enabled {
            let started = Instant::now();
            tracing::debug!(host = %self.address, feature = %feature, "Collecting");
            run_feature(adapter, self, feature).await;
            self.record_duration(feature.statistics_field(), started);

            if cancel.is_cancelled() {
                tracing::info!(host = %self.address, after = %feature, "Fetch interrupted");
                return;
            }
        }
    }

    /// Close the transport, record the total duration and seal the record.
    async fn finish(mut self, started: Instant) -> Data {
        self.client.close().await;
        self.record_duration("statistics_fetch_seconds".to_string(), started);
        self.data.seal(Utc::now());
        tracing::debug!(
            host = %self.address,
            duration_ms = started.elapsed().as_millis() as u64,
            metrics = self.data.metrics.len(),
            "Fetch finished"
        );
        self.data
    }
}

async fn run_feature(adapter: &mut dyn Adapter, device: &mut Device, feature: Feature) {
    match feature {
        Feature::Uptime => adapter.uptime(device).await,
        Feature::InterfaceCounters => adapter.interface_counters(device).await,
        Feature::NetworkAcl => adapter.network_acl(device).await,
        Feature::NetworkPolicy => adapter.network_policy(device).await,
        Feature::BgpPeers => adapter.bgp_peers(device).await,
        Feature::CellInfo => adapter.cell_info(device).await,
        Feature::Memory => adapter.memory(device).await,
        Feature::Cpu => adapter.cpu(device).await,
        Feature::Sensors => adapter.sensors(device).await,
        Feature::Ntp => adapter.ntp(device).await,
    }
}

/// Fetch one host: connect, identify, collect, and always return a sealed
/// record, partial or not.
pub async fn fetch(host: &HostConfig, connector: &dyn Connector, cancel: &CancellationToken) -> Data {
    let started = Instant::now();
    let kind = DeviceKind::from_type_tag(&host.device_type);
    let mut adapter = kind.adapter();

    let mut features = host.features;
    features.restrict_to(adapter.supported());

    match connector.connect(host).await {
        Ok(client) => {
            let mut device = Device::new(host, client, features, adapter.bulk());
            device.collect(adapter.as_mut(), cancel).await;
            device.finish(started).await
        }
        Err(e) => {
            tracing::warn!(host = %host.ip, error = %e, "Could not open SNMP session");
            let mut data = Data::new();
            data.add_tag("device_ip", host.ip.to_string());
            data.add_tag("device_type", host.device_type.to_lowercase());
            if features.statistics {
                data.metric_mut(data::STATISTICS).add_field(
                    "0",
                    "statistics_fetch_seconds",
                    started.elapsed().as_secs_f64(),
                );
            }
            data.seal(Utc::now());
            data
        }
    }
}
