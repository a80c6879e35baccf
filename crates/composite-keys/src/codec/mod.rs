//! Codecs - Conversions between storage and external key representations

pub mod binary;

pub use binary::{is_hex_like, BinaryCodec};
