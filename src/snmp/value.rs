//! Owned SNMP variable values.

use crate::data::FieldValue;

/// A decoded SNMP varbind value detached from the session buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    /// INTEGER / Integer32.
    Integer(i64),
    /// Counter32, Gauge32, Unsigned32, TimeTicks.
    Unsigned(u32),
    /// Counter64.
    Counter64(u64),
    /// OCTET STRING (also carries IpAddress and OBJECT IDENTIFIER as text).
    OctetString(Vec<u8>),
    /// NULL or any value the collector does not interpret.
    Null,
}

impl SnmpValue {
    /// Integer view of numeric values.
    ///
    /// Counter64 values above `i64::MAX` wrap, matching the time-series
    /// store's signed integer type.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Unsigned(v) => Some(i64::from(*v)),
            Self::Counter64(v) => Some(*v as i64),
            Self::OctetString(_) | Self::Null => None,
        }
    }

    /// Floating point view of numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Unsigned(v) => Some(f64::from(*v)),
            Self::Counter64(v) => Some(*v as f64),
            Self::OctetString(_) | Self::Null => None,
        }
    }

    /// Text view of OCTET STRING values (lossy UTF-8).
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::OctetString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// Convert to a metric field value, `None` for NULL.
    pub fn to_field(&self) -> Option<FieldValue> {
        match self {
            Self::OctetString(_) => self.as_text().map(FieldValue::Text),
            Self::Null => None,
            _ => self.as_i64().map(FieldValue::Integer),
        }
    }
}
