//! Key Input - everything a caller may hand in to identify rows
//!
//! Entities, tuples, normalized keys, bare scalars and nested collections of
//! those are all accepted. Each variant has one explicit extraction path into
//! key tuples; nothing is guessed at runtime.

use crate::config::KeyConfig;
use crate::error::{KeyError, KeyResult};
use crate::key::normalizer;
use crate::key::tuple::KeyTuple;
use crate::model::AttributeSource;
use crate::value::KeyValue;

/// Key-bearing input
pub enum KeyInput<'a> {
    /// An entity whose key attributes are read directly
    Entity(&'a dyn AttributeSource),
    /// An already decomposed key
    Tuple(KeyTuple),
    /// A normalized key string
    Normalized(String),
    /// A bare value for a single-column key
    Scalar(KeyValue),
    Collection(Vec<KeyInput<'a>>),
}

impl<'a> KeyInput<'a> {
    pub fn entity(entity: &'a dyn AttributeSource) -> Self {
        KeyInput::Entity(entity)
    }

    pub fn entities<E: AttributeSource>(entities: &'a [E]) -> Self {
        KeyInput::Collection(
            entities
                .iter()
                .map(|entity| KeyInput::Entity(entity as &dyn AttributeSource))
                .collect(),
        )
    }

    /// Flatten nested collections into a list of single inputs
    pub fn flatten(self) -> Vec<KeyInput<'a>> {
        match self {
            KeyInput::Collection(items) => items.into_iter().flat_map(KeyInput::flatten).collect(),
            single => vec![single],
        }
    }

    /// Resolve into key tuples for the given declaration.
    ///
    /// Text handed in for a composite key is decoded as a normalized key;
    /// any other bare scalar for a composite key is a caller error.
    pub fn into_tuples(self, config: &KeyConfig) -> KeyResult<Vec<KeyTuple>> {
        self.flatten()
            .into_iter()
            .map(|input| input.into_tuple(config))
            .collect()
    }

    pub(crate) fn into_tuple(self, config: &KeyConfig) -> KeyResult<KeyTuple> {
        match self {
            // absent attributes become NULL so they surface as missing keys
            KeyInput::Entity(entity) => Ok(config
                .key_columns
                .iter()
                .map(|column| (column.as_str(), entity.attribute(column).unwrap_or_default()))
                .collect()),
            KeyInput::Tuple(tuple) => Ok(tuple),
            KeyInput::Normalized(key) => resolve_text(config, key),
            KeyInput::Scalar(KeyValue::Text(text)) => resolve_text(config, text),
            KeyInput::Scalar(value) => {
                if config.is_composite() {
                    return Err(KeyError::WrongKey(format!(
                        "table '{}' has a composite key ({}); got bare value {}",
                        config.table,
                        config.key_columns.join(", "),
                        value
                    )));
                }
                Ok(KeyTuple::new().with(config.first_key_column()?, value))
            }
            KeyInput::Collection(_) => Err(KeyError::WrongKey(
                "a collection was given where a single key is expected".to_string(),
            )),
        }
    }
}

fn resolve_text(config: &KeyConfig, text: String) -> KeyResult<KeyTuple> {
    if config.is_composite() {
        normalizer::decode(config, &text)
    } else {
        Ok(KeyTuple::new().with(config.first_key_column()?, text))
    }
}

impl std::fmt::Debug for KeyInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyInput::Entity(_) => write!(f, "Entity(..)"),
            KeyInput::Tuple(tuple) => write!(f, "Tuple({})", tuple.to_json()),
            KeyInput::Normalized(key) => write!(f, "Normalized({:?})", key),
            KeyInput::Scalar(value) => write!(f, "Scalar({:?})", value),
            KeyInput::Collection(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl<'a> From<&'a dyn AttributeSource> for KeyInput<'a> {
    fn from(entity: &'a dyn AttributeSource) -> Self {
        KeyInput::Entity(entity)
    }
}

impl From<KeyTuple> for KeyInput<'_> {
    fn from(tuple: KeyTuple) -> Self {
        KeyInput::Tuple(tuple)
    }
}

impl From<KeyValue> for KeyInput<'_> {
    fn from(value: KeyValue) -> Self {
        KeyInput::Scalar(value)
    }
}

impl From<&str> for KeyInput<'_> {
    fn from(key: &str) -> Self {
        KeyInput::Normalized(key.to_string())
    }
}

impl From<String> for KeyInput<'_> {
    fn from(key: String) -> Self {
        KeyInput::Normalized(key)
    }
}

impl From<i64> for KeyInput<'_> {
    fn from(value: i64) -> Self {
        KeyInput::Scalar(KeyValue::Integer(value))
    }
}

impl<'a, T: Into<KeyInput<'a>>> From<Vec<T>> for KeyInput<'a> {
    fn from(items: Vec<T>) -> Self {
        KeyInput::Collection(items.into_iter().map(Into::into).collect())
    }
}
