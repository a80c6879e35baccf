//! Pivot table configuration, attachment records and sync plans

use serde::{Deserialize, Serialize};

use crate::error::{KeyError, KeyResult};
use crate::query::QueryBuilder;
use crate::value::KeyValue;

/// Pivot table configuration for many-to-many relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotConfig {
    /// The pivot table name
    pub table: String,

    /// Pivot column referencing the parent
    pub foreign_pivot_key: String,

    /// Pivot column referencing the related entity
    pub related_pivot_key: String,

    /// Parent column the foreign pivot key points at
    pub parent_key: String,

    /// Related column the related pivot key points at
    pub related_key: String,

    /// Whether attachments carry `created_at` / `updated_at`
    pub with_timestamps: bool,
}

impl PivotConfig {
    pub fn new(
        table: &str,
        foreign_pivot_key: &str,
        related_pivot_key: &str,
        parent_key: &str,
        related_key: &str,
    ) -> Self {
        Self {
            table: table.to_string(),
            foreign_pivot_key: foreign_pivot_key.to_string(),
            related_pivot_key: related_pivot_key.to_string(),
            parent_key: parent_key.to_string(),
            related_key: related_key.to_string(),
            with_timestamps: false,
        }
    }

    /// Enable timestamp columns on the pivot table
    pub fn with_timestamps(mut self) -> Self {
        self.with_timestamps = true;
        self
    }

    /// Validate the pivot configuration
    pub fn validate(&self) -> KeyResult<()> {
        let required = [
            ("table", &self.table),
            ("foreign_pivot_key", &self.foreign_pivot_key),
            ("related_pivot_key", &self.related_pivot_key),
            ("parent_key", &self.parent_key),
            ("related_key", &self.related_key),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(KeyError::invalid_configuration(field, "cannot be empty"));
            }
        }

        if self.foreign_pivot_key == self.related_pivot_key {
            return Err(KeyError::invalid_configuration(
                "related_pivot_key",
                "must differ from the foreign pivot key",
            ));
        }

        Ok(())
    }
}

/// One row to be inserted into a pivot table, columns in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotRecord {
    values: Vec<(String, KeyValue)>,
}

impl PivotRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing an earlier value in place
    pub fn set<V: Into<KeyValue>>(&mut self, column: &str, value: V) {
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| name == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&KeyValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// INSERT statement for this record
    pub fn into_insert(self, table: &str) -> QueryBuilder {
        QueryBuilder::new().insert_into(table).set_values(self.values)
    }
}

/// Related ids added and removed by a sync
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncChanges {
    pub attached: Vec<KeyValue>,
    pub detached: Vec<KeyValue>,
}

impl SyncChanges {
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}
