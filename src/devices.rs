//! Device Adapters
//!
//! Each supported device family maps feature collectors to the SNMP tables
//! its agents expose. The shared [`Device`] base owns the transport and the
//! record under construction; an [`Adapter`] adds vendor collectors on top.
//!
//! # Families
//!
//! | Type string      | Bulk | Vendor collectors                          |
//! |------------------|------|--------------------------------------------|
//! | `generic`        | no   | -                                          |
//! | `cisco-ios`      | yes  | ACL, BGP, memory, CPU, sensors             |
//! | `cisco-ios-xr`   | yes  | QoS policy, BGP, memory, CPU, sensors      |
//! | `opengear`       | yes  | cell, memory, CPU, sensors                 |
//! | `mrv`            | no   | cell, sensors                              |
//! | `meinberg`/`ntp` | no   | memory, CPU, sensors, NTP                  |
//!
//! Unknown type strings resolve to `generic`.

mod cisco;
mod device;
mod feature;
mod generic;
mod inventory;
mod ios;
mod iosxr;
mod kind;
mod meinberg;
mod mrv;
mod opengear;
mod ucd;

pub use device::{Adapter, Device, fetch};
pub use feature::{Feature, Features};
pub use kind::DeviceKind;
