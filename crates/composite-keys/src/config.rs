//! Key Configuration - Per-entity key declaration
//!
//! A `KeyConfig` is declared once per entity type and never changes. It carries
//! the ordered key columns, the binary column set and the hex-at-rest flag,
//! and is handed to every component that needs them instead of being looked
//! up at runtime.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::codec::BinaryCodec;
use crate::error::{KeyError, KeyResult};
use crate::key::normalizer::{NORMALIZED_KEY_DELIMITER, NORMALIZED_KEY_NAME};

/// Immutable key declaration for one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Table the entity lives in, used to qualify key columns
    pub table: String,

    /// Ordered key columns
    pub key_columns: Vec<String>,

    /// Columns stored as raw bytes
    #[serde(default)]
    pub binary_columns: BTreeSet<String>,

    /// Binary columns already hold hex text at rest
    #[serde(default)]
    pub hex_mode: bool,
}

impl KeyConfig {
    /// Create a config keyed by the given columns, in order
    pub fn new<I, S>(table: &str, key_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.to_string(),
            key_columns: key_columns.into_iter().map(Into::into).collect(),
            binary_columns: BTreeSet::new(),
            hex_mode: false,
        }
    }

    /// Declare binary columns
    pub fn with_binary_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binary_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Set whether binary columns are stored as hex text
    pub fn with_hex_mode(mut self, hex_mode: bool) -> Self {
        self.hex_mode = hex_mode;
        self
    }

    /// Parse and validate a config from JSON
    pub fn from_json(json: &str) -> KeyResult<Self> {
        let config: KeyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the declaration
    pub fn validate(&self) -> KeyResult<()> {
        if self.table.is_empty() {
            return Err(KeyError::invalid_configuration(
                "table",
                "table name cannot be empty",
            ));
        }

        if self.key_columns.is_empty() {
            return Err(KeyError::invalid_configuration(
                "key_columns",
                "at least one key column is required",
            ));
        }

        let mut seen = BTreeSet::new();
        for column in &self.key_columns {
            if column.is_empty() {
                return Err(KeyError::invalid_configuration(
                    "key_columns",
                    "key column names cannot be empty",
                ));
            }
            if !seen.insert(column.as_str()) {
                return Err(KeyError::invalid_configuration(
                    "key_columns",
                    format!("duplicate key column '{}'", column),
                ));
            }
            if column == NORMALIZED_KEY_NAME {
                return Err(KeyError::invalid_configuration(
                    "key_columns",
                    format!("'{}' is reserved for the normalized key", NORMALIZED_KEY_NAME),
                ));
            }
            if column.contains(NORMALIZED_KEY_DELIMITER) {
                return Err(KeyError::invalid_configuration(
                    "key_columns",
                    format!(
                        "key column '{}' contains the delimiter '{}'",
                        column, NORMALIZED_KEY_DELIMITER
                    ),
                ));
            }
        }

        Ok(())
    }

    /// First declared key column, the whole key for single-column entities
    pub fn first_key_column(&self) -> KeyResult<&str> {
        self.key_columns
            .first()
            .map(String::as_str)
            .ok_or_else(|| {
                KeyError::invalid_configuration(
                    "key_columns",
                    "at least one key column is required",
                )
            })
    }

    /// Number of key columns
    pub fn key_len(&self) -> usize {
        self.key_columns.len()
    }

    /// True when the key spans more than one column
    pub fn is_composite(&self) -> bool {
        self.key_columns.len() > 1
    }

    pub fn is_binary_column(&self, column: &str) -> bool {
        self.binary_columns.contains(column)
    }

    pub fn has_binary_columns(&self) -> bool {
        !self.binary_columns.is_empty()
    }

    /// Single-valued key name: the column itself, or the normalized key field
    /// for composite keys
    pub fn key_name(&self) -> String {
        match self.key_columns.as_slice() {
            [single] => single.clone(),
            _ => NORMALIZED_KEY_NAME.to_string(),
        }
    }

    /// Binary codec bound to this declaration
    pub fn codec(&self) -> BinaryCodec<'_> {
        BinaryCodec::new(self)
    }

    /// Qualify a column with the table name, leaving qualified names alone
    pub fn qualify_column(&self, column: &str) -> String {
        if column.contains('.') {
            column.to_string()
        } else {
            format!("{}.{}", self.table, column)
        }
    }
}
