//! Error types for composite key handling
//!
//! Every error here is a data-correctness error: it is raised where it is
//! detected and handed back to the caller unchanged.

use thiserror::Error;

/// Result type alias for key operations
pub type KeyResult<T> = Result<T, KeyError>;

/// Error types for key resolution, encoding and predicate building
#[derive(Debug, Error)]
pub enum KeyError {
    /// A tuple or entity lacks a value for a declared key column
    #[error("Missing value for key {column} in record {record}")]
    MissingKeyValue { column: String, record: String },

    /// A normalized key does not split into the declared number of segments
    #[error("Malformed normalized key '{key}': expected {expected} segments, found {found}")]
    MalformedKey {
        key: String,
        expected: usize,
        found: usize,
    },

    /// Single-column handling used on a composite key, or the reverse
    #[error("Wrong key: {0}")]
    WrongKey(String),

    /// Key declaration rejected by validation
    #[error("Invalid key configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KeyError {
    /// Create a missing key value error
    pub fn missing_key_value(column: impl Into<String>, record: impl Into<String>) -> Self {
        Self::MissingKeyValue {
            column: column.into(),
            record: record.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending key column, when the error carries one
    pub fn column(&self) -> Option<&str> {
        match self {
            KeyError::MissingKeyValue { column, .. } => Some(column),
            _ => None,
        }
    }
}
