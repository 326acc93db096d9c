//! Observability metadata attached to materialized assets.
//!
//! An asset returns its value wrapped in a [`MaterializeResult`] together
//! with a small map of facts worth surfacing to whoever hosts the pipeline:
//! counts, links to the backend, previews of the data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata keyed by label, serialized in label order.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single typed metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// A link a UI can render as clickable.
    Url(String),
    /// Free-form structured preview.
    Json(Value),
}

impl MetadataValue {
    pub fn url(url: impl Into<String>) -> Self {
        MetadataValue::Url(url.into())
    }

    pub fn json(value: impl Into<Value>) -> Self {
        MetadataValue::Json(value.into())
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        MetadataValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<Option<String>> for MetadataValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => MetadataValue::Text(text),
            None => MetadataValue::Json(Value::Null),
        }
    }
}

/// An asset's computed value plus the metadata recorded alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeResult<T> {
    pub value: T,
    pub metadata: Metadata,
}

impl<T> MaterializeResult<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            metadata: Metadata::new(),
        }
    }

    /// Attach `key = value`, replacing an earlier entry with the same key.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_entries() {
        let result = MaterializeResult::new(vec![1, 2, 3])
            .with_metadata("count", 3usize)
            .with_metadata("preview", MetadataValue::json(json!([1, 2, 3])))
            .with_metadata("link", MetadataValue::url("http://localhost:6333"));

        assert_eq!(result.metadata("count"), Some(&MetadataValue::Int(3)));
        assert_eq!(
            result.metadata("link"),
            Some(&MetadataValue::Url("http://localhost:6333".into()))
        );
        assert_eq!(result.metadata.len(), 3);
    }

    #[test]
    fn later_entry_replaces_earlier() {
        let result = MaterializeResult::new(())
            .with_metadata("result", 1i64)
            .with_metadata("result", 2i64);
        assert_eq!(result.metadata("result"), Some(&MetadataValue::Int(2)));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let value = serde_json::to_value(MetadataValue::url("http://x")).unwrap();
        assert_eq!(value, json!({ "kind": "url", "value": "http://x" }));
    }

    #[test]
    fn absent_text_is_null_json() {
        assert_eq!(
            MetadataValue::from(None::<String>),
            MetadataValue::Json(Value::Null)
        );
    }
}
