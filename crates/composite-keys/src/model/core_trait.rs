//! Core Entity Traits - the narrow interface the key layer consumes

use std::collections::{BTreeMap, HashMap};

use crate::config::KeyConfig;
use crate::key::KeyTuple;
use crate::value::KeyValue;

/// Anything that exposes column values by name
pub trait AttributeSource {
    /// Current value of a column, `None` when the column is absent
    fn attribute(&self, column: &str) -> Option<KeyValue>;
}

/// An entity type with a declared (possibly composite) key
pub trait KeyedEntity: AttributeSource {
    /// Key declaration shared by every instance of the type
    fn key_config() -> &'static KeyConfig;

    /// Value of a column as last loaded from storage
    fn original_attribute(&self, column: &str) -> Option<KeyValue> {
        self.attribute(column)
    }

    fn set_attribute(&mut self, column: &str, value: KeyValue);

    /// All attributes in storage form, in display order
    fn attributes(&self) -> Vec<(String, KeyValue)>;

    /// Name of the route parameter used to bind this entity
    fn route_key_name() -> String {
        Self::key_config().key_name()
    }
}

impl AttributeSource for KeyTuple {
    fn attribute(&self, column: &str) -> Option<KeyValue> {
        self.get(column).cloned()
    }
}

impl AttributeSource for HashMap<String, KeyValue> {
    fn attribute(&self, column: &str) -> Option<KeyValue> {
        self.get(column).cloned()
    }
}

impl AttributeSource for BTreeMap<String, KeyValue> {
    fn attribute(&self, column: &str) -> Option<KeyValue> {
        self.get(column).cloned()
    }
}
