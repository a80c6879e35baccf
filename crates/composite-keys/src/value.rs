//! Key Values - Scalar values carried by key tuples, predicates and pivot records
//!
//! Unlike `serde_json::Value` a key value can hold raw bytes, which is what
//! binary key columns store at rest.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A single column value as seen by the key layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum KeyValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl KeyValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, KeyValue::Null)
    }

    /// Borrow the textual form if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as one normalized-key segment
    pub fn to_segment(&self) -> String {
        match self {
            KeyValue::Null => String::new(),
            KeyValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            KeyValue::Integer(i) => i.to_string(),
            KeyValue::Float(f) => f.to_string(),
            KeyValue::Text(s) => s.clone(),
            KeyValue::Bytes(b) => hex::encode_upper(b),
            KeyValue::Timestamp(ts) => ts.to_rfc3339(),
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            KeyValue::Null => JsonValue::Null,
            KeyValue::Bool(b) => JsonValue::Bool(*b),
            KeyValue::Integer(i) => JsonValue::Number((*i).into()),
            KeyValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            KeyValue::Text(s) => JsonValue::String(s.clone()),
            KeyValue::Bytes(b) => JsonValue::String(hex::encode_upper(b)),
            KeyValue::Timestamp(ts) => JsonValue::String(ts.to_rfc3339()),
        }
    }

    /// SQL-style equality: NULL equals nothing, and values of different
    /// kinds compare by their textual form (`1` matches `"1"`).
    pub fn sql_eq(&self, other: &KeyValue) -> bool {
        match (self, other) {
            (KeyValue::Null, _) | (_, KeyValue::Null) => false,
            (KeyValue::Integer(a), KeyValue::Float(b))
            | (KeyValue::Float(b), KeyValue::Integer(a)) => (*a as f64) == *b,
            (a, b) if std::mem::discriminant(a) == std::mem::discriminant(b) => a == b,
            (a, b) => a.to_segment() == b.to_segment(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.to_segment()),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Integer(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::Integer(value.into())
    }
}

impl From<u32> for KeyValue {
    fn from(value: u32) -> Self {
        KeyValue::Integer(value.into())
    }
}

impl From<f64> for KeyValue {
    fn from(value: f64) -> Self {
        KeyValue::Float(value)
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        KeyValue::Bool(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Text(value)
    }
}

impl From<Vec<u8>> for KeyValue {
    fn from(value: Vec<u8>) -> Self {
        KeyValue::Bytes(value)
    }
}

impl From<&[u8]> for KeyValue {
    fn from(value: &[u8]) -> Self {
        KeyValue::Bytes(value.to_vec())
    }
}

impl From<DateTime<Utc>> for KeyValue {
    fn from(value: DateTime<Utc>) -> Self {
        KeyValue::Timestamp(value)
    }
}

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(KeyValue::Null)
    }
}

impl From<JsonValue> for KeyValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => KeyValue::Null,
            JsonValue::Bool(b) => KeyValue::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => KeyValue::Integer(i),
                None => n.as_f64().map(KeyValue::Float).unwrap_or(KeyValue::Null),
            },
            JsonValue::String(s) => KeyValue::Text(s),
            // Arrays and objects are not key material; keep their JSON text
            other => KeyValue::Text(other.to_string()),
        }
    }
}
