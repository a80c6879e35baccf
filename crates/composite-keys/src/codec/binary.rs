//! Binary Codec - hex text ⇄ raw bytes for binary key columns
//!
//! Whether a supplied value is already hex-encoded is inferred from its shape:
//! any non-empty string of hex digits is treated as hex. A textual key that
//! happens to look like hex is therefore indistinguishable from an encoded
//! binary key.

use uuid::Uuid;

use crate::config::KeyConfig;
use crate::value::KeyValue;

/// True iff the text is non-empty and made only of hex digits
pub fn is_hex_like(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Converts values of binary columns between their storage and external forms
#[derive(Debug, Clone, Copy)]
pub struct BinaryCodec<'a> {
    config: &'a KeyConfig,
}

impl<'a> BinaryCodec<'a> {
    pub fn new(config: &'a KeyConfig) -> Self {
        Self { config }
    }

    /// True iff the value is text that looks hex-encoded.
    ///
    /// Only `Text` qualifies: an integer such as `1234` is never treated as
    /// hex, even though its digits would pass `is_hex_like`.
    pub fn is_hex_value(value: &KeyValue) -> bool {
        value.as_text().map(is_hex_like).unwrap_or(false)
    }

    /// True when values of this column go through the codec
    pub fn applies_to(&self, column: &str) -> bool {
        self.config.is_binary_column(column)
    }

    /// Convert an external value into what the column stores
    pub fn to_storage(&self, column: &str, value: KeyValue) -> KeyValue {
        if !self.applies_to(column) {
            return value;
        }

        if self.config.hex_mode {
            return match value {
                KeyValue::Bytes(bytes) => KeyValue::Text(hex::encode_upper(bytes)),
                KeyValue::Text(text) if is_hex_like(&text) => {
                    KeyValue::Text(text.to_ascii_uppercase())
                }
                other => other,
            };
        }

        match value {
            KeyValue::Text(text) if is_hex_like(&text) => {
                KeyValue::Bytes(decode_hex(column, &text))
            }
            other => other,
        }
    }

    /// Convert a stored value into its external form
    pub fn to_external(&self, column: &str, value: KeyValue) -> KeyValue {
        if !self.applies_to(column) {
            return value;
        }

        match value {
            KeyValue::Bytes(bytes) => KeyValue::Text(hex::encode_upper(bytes)),
            KeyValue::Text(text) if is_hex_like(&text) => KeyValue::Text(text.to_ascii_uppercase()),
            other => other,
        }
    }

    /// Fresh random key for an empty binary key column, in storage form
    pub fn generate_binary_key(&self) -> KeyValue {
        let bytes = Uuid::new_v4().into_bytes().to_vec();
        if self.config.hex_mode {
            KeyValue::Text(hex::encode_upper(bytes))
        } else {
            KeyValue::Bytes(bytes)
        }
    }
}

fn decode_hex(column: &str, text: &str) -> Vec<u8> {
    match hex::decode(text) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Column '{}' received malformed hex '{}': {}", column, text, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_config(hex_mode: bool) -> KeyConfig {
        KeyConfig::new("tokens", ["org_id", "token"])
            .with_binary_columns(["token"])
            .with_hex_mode(hex_mode)
    }

    #[test]
    fn test_is_hex_like() {
        assert!(is_hex_like("ABCD"));
        assert!(is_hex_like("0123456789abcdef"));
        assert!(!is_hex_like(""));
        assert!(!is_hex_like("XYZ"));
        assert!(!is_hex_like("AB CD"));
        assert!(!BinaryCodec::is_hex_value(&KeyValue::Integer(1234)));
        assert!(!BinaryCodec::is_hex_value(&KeyValue::Bytes(vec![1])));
    }

    #[test]
    fn test_to_external_uppercases_bytes() {
        let config = binary_config(false);
        let codec = BinaryCodec::new(&config);

        assert_eq!(
            codec.to_external("token", KeyValue::Bytes(vec![0xab, 0xcd])),
            KeyValue::Text("ABCD".to_string())
        );
        assert_eq!(
            codec.to_external("org_id", KeyValue::Bytes(vec![0xab])),
            KeyValue::Bytes(vec![0xab])
        );
    }

    #[test]
    fn test_to_storage_recovers_bytes() {
        let config = binary_config(false);
        let codec = BinaryCodec::new(&config);

        assert_eq!(
            codec.to_storage("token", KeyValue::from("ABCD")),
            KeyValue::Bytes(vec![0xab, 0xcd])
        );
        assert_eq!(
            codec.to_storage("token", KeyValue::from("not-hex")),
            KeyValue::from("not-hex")
        );
        assert_eq!(codec.to_storage("org_id", KeyValue::from("ABCD")), KeyValue::from("ABCD"));
    }

    #[test]
    fn test_to_storage_malformed_hex_yields_empty_bytes() {
        let config = binary_config(false);
        let codec = BinaryCodec::new(&config);

        assert_eq!(codec.to_storage("token", KeyValue::from("ABC")), KeyValue::Bytes(Vec::new()));
    }

    #[test]
    fn test_hex_mode_keeps_text() {
        let config = binary_config(true);
        let codec = BinaryCodec::new(&config);

        assert_eq!(codec.to_storage("token", KeyValue::from("abcd")), KeyValue::from("ABCD"));
        assert_eq!(
            codec.to_storage("token", KeyValue::Bytes(vec![0x01, 0xff])),
            KeyValue::from("01FF")
        );
    }

    #[test]
    fn test_generate_binary_key() {
        let config = binary_config(false);
        match BinaryCodec::new(&config).generate_binary_key() {
            KeyValue::Bytes(bytes) => assert_eq!(bytes.len(), 16),
            other => panic!("expected bytes, got {:?}", other),
        }

        let config = binary_config(true);
        match BinaryCodec::new(&config).generate_binary_key() {
            KeyValue::Text(text) => {
                assert_eq!(text.len(), 32);
                assert!(is_hex_like(&text));
                assert_eq!(text, text.to_ascii_uppercase());
            }
            other => panic!("expected hex text, got {:?}", other),
        }
    }
}
