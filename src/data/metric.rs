//! Row-index keyed metric storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Tags and fields of one metric, keyed by row index.
///
/// A row index identifies one physical entity (interface, sensor, peer).
/// Values added under the same index from different tables merge into the
/// same row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default)]
    pub tags: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub fields: BTreeMap<String, BTreeMap<String, FieldValue>>,
}

impl Metric {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tag(&mut self, index: impl Into<String>, name: impl Into<String>, value: impl Into<String>) {
        self.tags
            .entry(index.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    pub fn add_field(
        &mut self,
        index: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) {
        self.fields
            .entry(index.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    pub fn tag(&self, index: &str, name: &str) -> Option<&str> {
        self.tags.get(index)?.get(name).map(String::as_str)
    }

    pub fn field(&self, index: &str, name: &str) -> Option<&FieldValue> {
        self.fields.get(index)?.get(name)
    }

    /// All tags of one row.
    pub fn row_tags(&self, index: &str) -> Option<&BTreeMap<String, String>> {
        self.tags.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.fields.is_empty()
    }
}
