//! Key Normalizer - one string identifier for a composite key
//!
//! Segments are joined with `NORMALIZED_KEY_DELIMITER` in key column order.
//! Values are not escaped: a value containing the delimiter does not survive
//! a round trip, and callers must not produce such keys.

use crate::config::KeyConfig;
use crate::error::{KeyError, KeyResult};
use crate::key::tuple::KeyTuple;
use crate::value::KeyValue;

/// Separator between key segments
pub const NORMALIZED_KEY_DELIMITER: &str = "___";

/// Field name under which serialized entities carry their normalized key
pub const NORMALIZED_KEY_NAME: &str = "normalized_key";

/// Encode a tuple into its normalized key.
///
/// Binary columns are rendered in their external (uppercase hex) form and
/// NULL values as empty segments.
pub fn encode(config: &KeyConfig, tuple: &KeyTuple) -> KeyResult<String> {
    let codec = config.codec();
    let mut segments = Vec::with_capacity(config.key_len());

    for column in &config.key_columns {
        let value = tuple.get(column).cloned().ok_or_else(|| {
            KeyError::missing_key_value(column.as_str(), tuple.to_json().to_string())
        })?;
        segments.push(codec.to_external(column, value).to_segment());
    }

    Ok(segments.join(NORMALIZED_KEY_DELIMITER))
}

/// Decode a normalized key back into a tuple of text values
pub fn decode(config: &KeyConfig, normalized_key: &str) -> KeyResult<KeyTuple> {
    let segments: Vec<&str> = normalized_key.split(NORMALIZED_KEY_DELIMITER).collect();

    if segments.len() != config.key_len() {
        return Err(KeyError::MalformedKey {
            key: normalized_key.to_string(),
            expected: config.key_len(),
            found: segments.len(),
        });
    }

    Ok(config
        .key_columns
        .iter()
        .zip(segments)
        .map(|(column, segment)| (column.as_str(), KeyValue::from(segment)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> KeyConfig {
        KeyConfig::new("pairs", ["a", "b"])
    }

    #[test]
    fn test_encode_joins_in_key_order() {
        let tuple = KeyTuple::new().with("b", "Y").with("a", "X");
        assert_eq!(encode(&config(), &tuple).unwrap(), "X___Y");
    }

    #[test]
    fn test_decode_round_trip() {
        let tuple = KeyTuple::new().with("a", "X").with("b", "Y");
        let key = encode(&config(), &tuple).unwrap();
        assert_eq!(decode(&config(), &key).unwrap(), tuple);
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        match decode(&config(), "X") {
            Err(KeyError::MalformedKey { expected, found, .. }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected malformed key, got {:?}", other),
        }

        assert!(decode(&config(), "X___Y___Z").is_err());
    }

    #[test]
    fn test_encode_binary_columns_as_hex() {
        let config = KeyConfig::new("tokens", ["org_id", "token"]).with_binary_columns(["token"]);
        let tuple = KeyTuple::new()
            .with("org_id", 7)
            .with("token", vec![0xabu8, 0xcd]);

        assert_eq!(encode(&config, &tuple).unwrap(), "7___ABCD");
    }

    #[test]
    fn test_encode_requires_every_column() {
        let tuple = KeyTuple::new().with("a", "X");
        let err = encode(&config(), &tuple).unwrap_err();
        assert_eq!(err.column(), Some("b"));
    }

    #[test]
    fn test_null_encodes_as_empty_segment() {
        let tuple = KeyTuple::new().with("a", KeyValue::Null).with("b", 3);
        assert_eq!(encode(&config(), &tuple).unwrap(), "___3");
    }
}
