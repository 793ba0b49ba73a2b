//! UCD-SNMP-MIB collectors used by Linux-based appliances.

use crate::data::{self, Entry};

use super::Device;

const CPU: [Entry; 5] = [
    Entry::new("cpu_user", ".1.3.6.1.4.1.2021.11.50"),
    Entry::new("cpu_system", ".1.3.6.1.4.1.2021.11.52"),
    Entry::new("cpu_idle", ".1.3.6.1.4.1.2021.11.53"),
    Entry::new("cpu_wait", ".1.3.6.1.4.1.2021.11.54"),
    Entry::new("cpu_kernel", ".1.3.6.1.4.1.2021.11.55"),
];

const MEMORY_TOTALS: [Entry; 2] = [
    Entry::new("memory_total", ".1.3.6.1.4.1.2021.4.5"),
    Entry::new("memory_free", ".1.3.6.1.4.1.2021.4.11"),
];

const MEMORY_SWAP_AND_REAL: [Entry; 4] = [
    Entry::new("memory_swap_used_kbytes", ".1.3.6.1.4.1.2021.4.3"),
    Entry::new("memory_swap_free_kbytes", ".1.3.6.1.4.1.2021.4.4"),
    Entry::new("memory_real_used_kbytes", ".1.3.6.1.4.1.2021.4.5"),
    Entry::new("memory_real_free_kbytes", ".1.3.6.1.4.1.2021.4.6"),
];

/// Raw CPU tick counters.
pub(crate) async fn cpu(device: &mut Device) {
    device.add_fields(data::CPU, &CPU).await;
}

/// Total and free real memory.
pub(crate) async fn memory_totals(device: &mut Device) {
    device.add_fields(data::MEMORY, &MEMORY_TOTALS).await;
}

/// Swap and real memory, in kilobytes.
pub(crate) async fn memory_swap_and_real(device: &mut Device) {
    device.add_fields(data::MEMORY, &MEMORY_SWAP_AND_REAL).await;
}
