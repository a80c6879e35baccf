//! Composite Key Operations - key handling every keyed entity gets for free
//!
//! Covers reading the raw and normalized key, restricting select/save
//! statements to one row, bulk key scopes, route binding, key generation and
//! the external JSON form.

use serde_json::{Map, Value as JsonValue};

use crate::config::KeyConfig;
use crate::error::{KeyError, KeyResult};
use crate::key::{normalizer, KeyTuple, NORMALIZED_KEY_NAME};
use crate::model::core_trait::KeyedEntity;
use crate::query::QueryBuilder;
use crate::scope::{self, KeySelector};
use crate::value::KeyValue;

/// Extension trait adding key operations to keyed entities
pub trait CompositeKey: KeyedEntity + Sized {
    /// True when the key spans more than one column
    fn has_composite_key() -> bool {
        Self::key_config().is_composite()
    }

    /// Declared key columns, in order
    fn raw_key_names() -> &'static [String] {
        &Self::key_config().key_columns
    }

    /// Field name under which the single-valued key is exposed
    fn normalized_key_name() -> String {
        Self::key_config().key_name()
    }

    /// Current key values; absent attributes show up as NULL
    fn raw_key(&self) -> KeyTuple {
        Self::raw_key_names()
            .iter()
            .map(|column| (column.as_str(), self.attribute(column).unwrap_or_default()))
            .collect()
    }

    /// Single string identifying this entity
    fn normalized_key(&self) -> KeyResult<String> {
        normalizer::encode(Self::key_config(), &self.raw_key())
    }

    /// Key used to address the stored row: original values where known,
    /// current values otherwise
    fn key_for_save_query(&self) -> KeyTuple {
        Self::raw_key_names()
            .iter()
            .map(|column| {
                let value = self
                    .original_attribute(column)
                    .or_else(|| self.attribute(column))
                    .unwrap_or_default();
                (column.as_str(), value)
            })
            .collect()
    }

    /// Restrict a query to the stored row, using original key values
    fn set_keys_for_select_query<M>(&self, query: QueryBuilder<M>) -> KeyResult<QueryBuilder<M>> {
        restrict_to_key(
            Self::key_config(),
            query,
            |column| self.original_attribute(column),
            || self.key_for_save_query(),
        )
    }

    /// Restrict a query to this entity's row, using current key values
    fn set_keys_for_save_query<M>(&self, query: QueryBuilder<M>) -> KeyResult<QueryBuilder<M>> {
        restrict_to_key(
            Self::key_config(),
            query,
            |column| self.attribute(column),
            || self.raw_key(),
        )
    }

    /// Restrict any query to the selected keys
    fn apply_ids<M>(
        query: QueryBuilder<M>,
        selector: KeySelector<'_>,
    ) -> KeyResult<QueryBuilder<M>> {
        scope::apply_ids(Self::key_config(), query, selector)
    }

    /// SELECT the rows with the given keys
    fn query_for_keys(selector: KeySelector<'_>) -> KeyResult<QueryBuilder<Self>> {
        Self::apply_ids(QueryBuilder::new().from(&Self::key_config().table), selector)
    }

    /// DELETE the rows with the given keys
    fn destroy_query(selector: KeySelector<'_>) -> KeyResult<QueryBuilder<Self>> {
        Self::apply_ids(QueryBuilder::new().delete_from(&Self::key_config().table), selector)
    }

    /// SELECT the row this entity was loaded from
    fn refresh_query(&self) -> KeyResult<QueryBuilder<Self>> {
        self.set_keys_for_select_query(QueryBuilder::new().from(&Self::key_config().table))
            .map(|query| query.limit(1))
    }

    /// SELECT entities from queued identifiers (normalized keys for
    /// composite entities, plain values otherwise)
    fn new_query_for_restoration(ids: Vec<String>) -> KeyResult<QueryBuilder<Self>> {
        Self::query_for_keys(KeySelector::include(ids))
    }

    /// SELECT the entity bound to a route parameter.
    ///
    /// Without an explicit field, composite entities are looked up by
    /// normalized key. An explicit field is matched verbatim, except that
    /// naming the normalized key on a single-column entity is rejected.
    fn resolve_route_binding(value: &str, field: Option<&str>) -> KeyResult<QueryBuilder<Self>> {
        let config = Self::key_config();
        let route_key = field.map(str::to_string).unwrap_or_else(Self::route_key_name);

        if route_key == NORMALIZED_KEY_NAME {
            if !config.is_composite() {
                return Err(KeyError::WrongKey(format!(
                    "'{}' has a single-column key; cannot bind by {}",
                    config.table, NORMALIZED_KEY_NAME
                )));
            }
            return Self::query_for_keys(KeySelector::include([value])).map(|query| query.limit(1));
        }

        let stored = config.codec().to_storage(&route_key, KeyValue::from(value));
        Ok(QueryBuilder::new()
            .from(&config.table)
            .where_eq(&config.qualify_column(&route_key), stored)
            .limit(1))
    }

    /// Give empty binary key columns a freshly generated value
    fn fill_binary_keys(&mut self) {
        let config = Self::key_config();
        let codec = config.codec();

        for column in &config.key_columns {
            if !config.is_binary_column(column) {
                continue;
            }
            let empty = match self.attribute(column) {
                None | Some(KeyValue::Null) => true,
                Some(KeyValue::Text(text)) => text.is_empty(),
                Some(KeyValue::Bytes(bytes)) => bytes.is_empty(),
                Some(_) => false,
            };
            if empty {
                let generated = codec.generate_binary_key();
                tracing::debug!("Generated binary key for {}.{}", config.table, column);
                self.set_attribute(column, generated);
            }
        }
    }

    /// External JSON form: binary attributes as uppercase hex, plus the
    /// normalized key for composite entities
    fn to_external_json(&self) -> KeyResult<JsonValue> {
        let config = Self::key_config();
        let codec = config.codec();

        let mut object = Map::new();
        for (column, value) in self.attributes() {
            let value = codec.to_external(&column, value);
            object.insert(column, value.to_json());
        }

        if config.is_composite() {
            let key = self.normalized_key()?;
            object.insert(NORMALIZED_KEY_NAME.to_string(), JsonValue::String(key));
        }

        Ok(JsonValue::Object(object))
    }
}

impl<T: KeyedEntity> CompositeKey for T {}

fn restrict_to_key<M>(
    config: &KeyConfig,
    mut query: QueryBuilder<M>,
    read: impl Fn(&str) -> Option<KeyValue>,
    record: impl Fn() -> KeyTuple,
) -> KeyResult<QueryBuilder<M>> {
    let codec = config.codec();

    for column in &config.key_columns {
        let value = match read(column) {
            Some(value) if !value.is_null() => value,
            _ => {
                return Err(KeyError::missing_key_value(
                    column.as_str(),
                    record().to_json().to_string(),
                ))
            }
        };
        query = query.where_eq(column, codec.to_storage(column, value));
    }

    Ok(query)
}
