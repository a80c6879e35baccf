//! CompositeBelongsToMany - many-to-many pivot handling aware of binary keys
//!
//! Ids handed in by callers are resolved to the related entity's storage form,
//! and the parent key written to or matched in the pivot goes through the
//! parent's codec. The relation builds statements; it never runs them.

use std::marker::PhantomData;

use chrono::Utc;

use crate::codec::BinaryCodec;
use crate::error::{KeyError, KeyResult};
use crate::key::KeyInput;
use crate::model::KeyedEntity;
use crate::query::QueryBuilder;
use crate::value::KeyValue;

use super::pivot::{PivotConfig, PivotRecord, SyncChanges};

/// BelongsToMany relationship through a pivot table
pub struct CompositeBelongsToMany<Parent, Related>
where
    Parent: KeyedEntity,
    Related: KeyedEntity,
{
    parent: Parent,
    pivot: PivotConfig,
    pivot_wheres: Vec<(String, KeyValue)>,
    pivot_where_ins: Vec<(String, Vec<KeyValue>)>,
    pivot_values: Vec<(String, KeyValue)>,
    _related: PhantomData<Related>,
}

impl<Parent, Related> CompositeBelongsToMany<Parent, Related>
where
    Parent: KeyedEntity,
    Related: KeyedEntity,
{
    /// Create a new relation; parent and related keys default to the first
    /// declared key column of each side
    pub fn new(
        parent: Parent,
        pivot_table: &str,
        foreign_pivot_key: &str,
        related_pivot_key: &str,
    ) -> KeyResult<Self> {
        let parent_key = Parent::key_config().first_key_column()?;
        let related_key = Related::key_config().first_key_column()?;

        Self::with_config(
            parent,
            PivotConfig::new(
                pivot_table,
                foreign_pivot_key,
                related_pivot_key,
                parent_key,
                related_key,
            ),
        )
    }

    /// Create a relation from an explicit pivot configuration, rejecting
    /// configurations that fail validation
    pub fn with_config(parent: Parent, pivot: PivotConfig) -> KeyResult<Self> {
        pivot.validate()?;

        Ok(Self {
            parent,
            pivot,
            pivot_wheres: Vec::new(),
            pivot_where_ins: Vec::new(),
            pivot_values: Vec::new(),
            _related: PhantomData,
        })
    }

    pub fn parent_key(mut self, column: &str) -> Self {
        self.pivot.parent_key = column.to_string();
        self
    }

    pub fn related_key(mut self, column: &str) -> Self {
        self.pivot.related_key = column.to_string();
        self
    }

    pub fn with_timestamps(mut self) -> Self {
        self.pivot.with_timestamps = true;
        self
    }

    /// Only consider pivot rows where `column = value`
    pub fn where_pivot<V: Into<KeyValue>>(mut self, column: &str, value: V) -> Self {
        self.pivot_wheres.push((column.to_string(), value.into()));
        self
    }

    /// Only consider pivot rows where `column` is one of `values`
    pub fn where_pivot_in<V: Into<KeyValue>>(mut self, column: &str, values: Vec<V>) -> Self {
        self.pivot_where_ins
            .push((column.to_string(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Constrain to `column = value` and write that value on every attachment
    pub fn with_pivot_value<V: Into<KeyValue>>(mut self, column: &str, value: V) -> Self {
        let value = value.into();
        self.pivot_values.push((column.to_string(), value.clone()));
        self.where_pivot(column, value)
    }

    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    pub fn pivot_config(&self) -> &PivotConfig {
        &self.pivot
    }

    /// Resolve any key-bearing input into related ids in storage form
    pub fn resolve_ids(&self, input: KeyInput<'_>) -> KeyResult<Vec<KeyValue>> {
        input
            .flatten()
            .into_iter()
            .map(|single| self.resolve_single(single))
            .collect()
    }

    /// Resolve input that must name exactly one related id
    pub fn resolve_id(&self, input: KeyInput<'_>) -> KeyResult<KeyValue> {
        let mut inputs = input.flatten();
        if inputs.len() != 1 {
            return Err(KeyError::WrongKey(format!(
                "expected a single id for pivot '{}', got {}",
                self.pivot.table,
                inputs.len()
            )));
        }
        match inputs.pop() {
            Some(single) => self.resolve_single(single),
            None => Err(KeyError::WrongKey(format!(
                "expected a single id for pivot '{}'",
                self.pivot.table
            ))),
        }
    }

    fn resolve_single(&self, input: KeyInput<'_>) -> KeyResult<KeyValue> {
        let related_key = self.pivot.related_key.as_str();

        match input {
            KeyInput::Entity(entity) => {
                let value = match entity.attribute(related_key) {
                    Some(value) if !value.is_null() => value,
                    _ => {
                        return Err(KeyError::missing_key_value(
                            related_key,
                            format!("{} entity", Related::key_config().table),
                        ))
                    }
                };
                Ok(Related::key_config().codec().to_storage(related_key, value))
            }
            KeyInput::Tuple(tuple) => Ok(self.normalize_id(tuple.require(related_key)?.clone())),
            KeyInput::Normalized(key) => Ok(self.normalize_id(KeyValue::Text(key))),
            KeyInput::Scalar(value) => Ok(self.normalize_id(value)),
            KeyInput::Collection(_) => Err(KeyError::WrongKey(
                "nested collection left after flattening".to_string(),
            )),
        }
    }

    /// Caller-supplied ids are only recovered from hex when the related
    /// type declares binary columns at all
    fn normalize_id(&self, value: KeyValue) -> KeyValue {
        let config = Related::key_config();
        if config.has_binary_columns() && BinaryCodec::is_hex_value(&value) {
            config.codec().to_storage(&self.pivot.related_key, value)
        } else {
            value
        }
    }

    /// Parent key value in storage form
    fn parent_key_value(&self) -> KeyResult<KeyValue> {
        let column = self.pivot.parent_key.as_str();
        let config = Parent::key_config();

        match self.parent.attribute(column) {
            Some(value) if !value.is_null() => Ok(config.codec().to_storage(column, value)),
            _ => {
                let record = self
                    .parent
                    .attributes()
                    .into_iter()
                    .map(|(name, value)| (name, value.to_json()))
                    .collect::<serde_json::Map<_, _>>();
                Err(KeyError::missing_key_value(
                    column,
                    serde_json::Value::Object(record).to_string(),
                ))
            }
        }
    }

    /// Apply pivot constraints and the parent key to a pivot statement
    fn constrain<M>(&self, mut query: QueryBuilder<M>) -> KeyResult<QueryBuilder<M>> {
        for (column, value) in &self.pivot_wheres {
            query = query.where_eq(column, value.clone());
        }
        for (column, values) in &self.pivot_where_ins {
            query = query.where_in(column, values.clone());
        }
        Ok(query.where_eq(&self.pivot.foreign_pivot_key, self.parent_key_value()?))
    }

    /// SELECT over the pivot rows belonging to the parent
    pub fn new_pivot_query(&self) -> KeyResult<QueryBuilder> {
        self.constrain(QueryBuilder::new().from(&self.pivot.table))
    }

    /// Pivot row linking the parent to `id`
    pub fn base_attach_record(&self, id: KeyValue, timed: bool) -> KeyResult<PivotRecord> {
        let mut record = PivotRecord::new();
        record.set(&self.pivot.related_pivot_key, id);
        record.set(&self.pivot.foreign_pivot_key, self.parent_key_value()?);

        if timed {
            let now = Utc::now();
            record.set("created_at", now);
            record.set("updated_at", now);
        }

        for (column, value) in &self.pivot_values {
            record.set(column, value.clone());
        }

        Ok(record)
    }

    /// INSERT statements attaching the given related ids
    pub fn attach(
        &self,
        input: KeyInput<'_>,
        extra: Vec<(String, KeyValue)>,
    ) -> KeyResult<Vec<QueryBuilder>> {
        let ids = self.resolve_ids(input)?;
        self.attach_ids(ids, &extra)
    }

    fn attach_ids(
        &self,
        ids: Vec<KeyValue>,
        extra: &[(String, KeyValue)],
    ) -> KeyResult<Vec<QueryBuilder>> {
        let mut statements = Vec::with_capacity(ids.len());
        for id in ids {
            let mut record = self.base_attach_record(id, self.pivot.with_timestamps)?;
            for (column, value) in extra {
                record.set(column, value.clone());
            }
            statements.push(record.into_insert(&self.pivot.table));
        }

        tracing::debug!(
            "Built {} attach statement(s) for pivot {}",
            statements.len(),
            self.pivot.table
        );
        Ok(statements)
    }

    /// DELETE statement detaching the given ids, or every row of the parent
    /// when no ids are given
    pub fn detach(&self, input: Option<KeyInput<'_>>) -> KeyResult<QueryBuilder> {
        let ids = input.map(|input| self.resolve_ids(input)).transpose()?;
        self.detach_ids(ids)
    }

    fn detach_ids(&self, ids: Option<Vec<KeyValue>>) -> KeyResult<QueryBuilder> {
        let query = self.constrain(QueryBuilder::new().delete_from(&self.pivot.table))?;

        tracing::debug!(
            "Built detach statement for pivot {} ({} id(s))",
            self.pivot.table,
            ids.as_ref().map(|ids| ids.len().to_string()).unwrap_or_else(|| "all".to_string())
        );

        Ok(match ids {
            Some(ids) => query.where_in(&self.pivot.related_pivot_key, ids),
            None => query,
        })
    }

    /// Plan bringing the pivot from `current` ids to exactly the given ids.
    ///
    /// Returns the change set and the statements realizing it: one DELETE for
    /// the detached ids followed by one INSERT per attached id.
    pub fn sync(
        &self,
        current: &[KeyValue],
        input: KeyInput<'_>,
    ) -> KeyResult<(SyncChanges, Vec<QueryBuilder>)> {
        let mut desired: Vec<KeyValue> = Vec::new();
        for id in self.resolve_ids(input)? {
            if !contains(&desired, &id) {
                desired.push(id);
            }
        }

        let changes = SyncChanges {
            detached: current
                .iter()
                .filter(|id| !contains(&desired, id))
                .cloned()
                .collect(),
            attached: desired
                .into_iter()
                .filter(|id| !contains(current, id))
                .collect(),
        };

        let mut statements = Vec::new();
        if !changes.detached.is_empty() {
            statements.push(self.detach_ids(Some(changes.detached.clone()))?);
        }
        statements.extend(self.attach_ids(changes.attached.clone(), &[])?);

        Ok((changes, statements))
    }
}

fn contains(ids: &[KeyValue], id: &KeyValue) -> bool {
    ids.iter().any(|existing| existing.sql_eq(id))
}
