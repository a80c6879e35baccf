//! Key Tuples - column → value mappings identifying one row

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::codec::BinaryCodec;
use crate::error::{KeyError, KeyResult};
use crate::value::KeyValue;

/// Mapping from key column to value.
///
/// An empty tuple is a sentinel for rows without identifying values: it
/// matches NULL in every key column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyTuple {
    values: BTreeMap<String, KeyValue>,
}

impl KeyTuple {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column value
    pub fn with<V: Into<KeyValue>>(mut self, column: &str, value: V) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert<V: Into<KeyValue>>(&mut self, column: &str, value: V) {
        self.values.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&KeyValue> {
        self.values.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeyValue)> {
        self.values.iter()
    }

    /// Value for a declared key column. A NULL value counts as missing.
    pub fn require(&self, column: &str) -> KeyResult<&KeyValue> {
        match self.values.get(column) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(KeyError::missing_key_value(column, self.to_json().to_string())),
        }
    }

    /// Run every binary column through the codec's storage conversion
    pub fn into_storage(self, codec: &BinaryCodec<'_>) -> Self {
        let values = self
            .values
            .into_iter()
            .map(|(column, value)| {
                let value = codec.to_storage(&column, value);
                (column, value)
            })
            .collect();
        Self { values }
    }

    /// Run every binary column through the codec's external conversion
    pub fn into_external(self, codec: &BinaryCodec<'_>) -> Self {
        let values = self
            .values
            .into_iter()
            .map(|(column, value)| {
                let value = codec.to_external(&column, value);
                (column, value)
            })
            .collect();
        Self { values }
    }

    /// JSON object rendering, used in error messages and serialization
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.values
                .iter()
                .map(|(column, value)| (column.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl<S, V> FromIterator<(S, V)> for KeyTuple
where
    S: Into<String>,
    V: Into<KeyValue>,
{
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyConfig;

    #[test]
    fn test_require_reports_column_and_record() {
        let tuple = KeyTuple::new().with("org_id", 1);

        assert_eq!(tuple.require("org_id").unwrap(), &KeyValue::Integer(1));
        match tuple.require("user_id") {
            Err(KeyError::MissingKeyValue { column, record }) => {
                assert_eq!(column, "user_id");
                assert_eq!(record, r#"{"org_id":1}"#);
            }
            other => panic!("expected missing key value, got {:?}", other),
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let tuple = KeyTuple::new().with("org_id", KeyValue::Null);
        assert!(tuple.require("org_id").is_err());
    }

    #[test]
    fn test_storage_conversion_touches_binary_columns_only() {
        let config = KeyConfig::new("tokens", ["label", "token"]).with_binary_columns(["token"]);
        let tuple: KeyTuple = [("label", "CAFE"), ("token", "CAFE")].into_iter().collect();

        let stored = tuple.into_storage(&config.codec());
        assert_eq!(stored.get("label"), Some(&KeyValue::from("CAFE")));
        assert_eq!(stored.get("token"), Some(&KeyValue::Bytes(vec![0xca, 0xfe])));

        let external = stored.into_external(&config.codec());
        assert_eq!(external.get("token"), Some(&KeyValue::from("CAFE")));
    }
}
