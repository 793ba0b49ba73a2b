//! ENTITY-MIB physical inventory lookups.

use crate::data::{Entry, Metric, add_tags};

use super::Device;

const ENT_PHYSICAL_DESCR: &str = ".1.3.6.1.2.1.47.1.1.1.1.2";
const ENT_PHYSICAL_NAME: &str = ".1.3.6.1.2.1.47.1.1.1.1.7";

const ENTRIES: [Entry; 2] = [
    Entry::new("descr", ENT_PHYSICAL_DESCR),
    Entry::new("name", ENT_PHYSICAL_NAME),
];

/// Description and name of physical entities, keyed by entPhysicalIndex.
#[derive(Debug, Clone, Default)]
pub(crate) struct Inventory {
    entities: Metric,
}

impl Inventory {
    pub(crate) async fn load(device: &mut Device) -> Self {
        let mut entities = Metric::new();
        crate::data::join_entries(device.client.as_mut(), device.bulk, &mut entities, &ENTRIES, add_tags)
            .await;
        tracing::debug!(
            host = %device.address(),
            entities = entities.tags.len(),
            "Loaded physical inventory"
        );
        Self { entities }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entities.tags.is_empty()
    }

    pub(crate) fn descr(&self, index: &str) -> &str {
        self.entities.tag(index, "descr").unwrap_or_default()
    }

    pub(crate) fn name(&self, index: &str) -> &str {
        self.entities.tag(index, "name").unwrap_or_default()
    }

    /// Tag `row` with `{prefix}_descr` and `{prefix}_name` of entity `index`.
    ///
    /// Values the inventory does not know are left off.
    pub(crate) fn tag_row(&self, metric: &mut Metric, row: &str, index: &str, prefix: &str) {
        let descr = self.descr(index);
        if !descr.is_empty() {
            metric.add_tag(row, format!("{prefix}_descr"), descr);
        }
        let name = self.name(index);
        if !name.is_empty() {
            metric.add_tag(row, format!("{prefix}_name"), name);
        }
    }

    /// `"{name} - {descr}"` label used for entity sensors.
    pub(crate) fn label(&self, index: &str) -> String {
        format!("{} - {}", self.name(index), self.descr(index))
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: &[(&str, &str, &str)]) -> Self {
        let mut entities = Metric::new();
        for (index, descr, name) in entries {
            entities.add_tag(*index, "descr", *descr);
            entities.add_tag(*index, "name", *name);
        }
        Self { entities }
    }
}

/// Log and report whether a collector needing the inventory must be skipped.
pub(crate) fn missing(inventory: &Inventory, device: &Device, collector: &str) -> bool {
    if inventory.is_empty() {
        tracing::info!(host = %device.address(), collector, "Physical inventory empty, skipping");
        return true;
    }
    false
}
