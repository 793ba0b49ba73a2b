//! SNMP Transport Layer
//!
//! Thin async wrapper over `snmp2` exposing the two operations the device
//! adapters need: a multi-OID GET and a subtree WALK (GETNEXT or GETBULK).
//!
//! # Components
//!
//! - [`WalkClient`]: Per-host transport trait used by the join engine and adapters
//! - [`Connector`]: Factory that opens a [`WalkClient`] for a configured host
//! - [`SnmpConnector`]: Production connector backed by `snmp2::AsyncSession`
//! - [`index`]: Row-index extraction helpers shared by every vendor join

mod client;
mod error;
pub mod index;
mod session;
#[cfg(test)]
pub(crate) mod testing;
mod value;

pub use client::{Connector, Pdu, WalkClient};
pub use error::SnmpError;
pub use session::{SnmpConnector, SnmpSession};
pub use value::SnmpValue;
