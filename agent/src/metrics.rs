//! Metric records used for the spreadsheet artifact

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single metric value; numbers stay numbers, everything else is text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Number(value as f64)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

impl From<&serde_json::Value> for MetricValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(MetricValue::Number)
                .unwrap_or_else(|| MetricValue::Text(n.to_string())),
            serde_json::Value::String(s) => MetricValue::Text(s.clone()),
            other => MetricValue::Text(other.to_string()),
        }
    }
}

/// Ordered mapping from metric name to value
///
/// Key order is insertion order, which is the column order when the record
/// is the first one written to a sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricRecord(IndexMap<String, MetricValue>);

impl MetricRecord {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Add a metric, builder style
    pub fn with(mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.0.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &MetricValue> {
        self.0.values()
    }

    /// Build a record from a JSON object, keeping field order
    ///
    /// Returns `None` for anything that is not an object.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self(
            object
                .iter()
                .map(|(k, v)| (k.clone(), MetricValue::from(v)))
                .collect(),
        ))
    }
}
