//! Composite Key Scope - compiles a key selector into one grouped predicate
//!
//! Inclusion matches rows equal to any selected tuple (a multi-column `IN`).
//! Exclusion keeps rows that differ from every selected tuple in at least one
//! column (a multi-column `NOT IN`).

use crate::config::KeyConfig;
use crate::error::KeyResult;
use crate::key::{KeyInput, KeyTuple};
use crate::query::{Predicate, QueryBuilder};

/// Keys to match or exclude
#[derive(Debug)]
pub struct KeySelector<'a> {
    pub keys: Vec<KeyInput<'a>>,
    pub inverse: bool,
}

impl<'a> KeySelector<'a> {
    /// Match rows whose key equals any of the given keys
    pub fn include<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyInput<'a>>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            inverse: false,
        }
    }

    /// Match rows whose key differs from every given key
    pub fn exclude<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<KeyInput<'a>>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            inverse: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Scope restricting a query to the keys of a selector
#[derive(Debug)]
pub struct CompositeKeyScope<'a> {
    config: &'a KeyConfig,
    selector: KeySelector<'a>,
}

impl<'a> CompositeKeyScope<'a> {
    pub fn new(config: &'a KeyConfig, selector: KeySelector<'a>) -> Self {
        Self { config, selector }
    }

    /// Compile the selector into a predicate over qualified key columns
    pub fn compile(self) -> KeyResult<Predicate> {
        self.config.validate()?;

        let codec = self.config.codec();
        let inverse = self.selector.inverse;
        let mut predicates = Vec::with_capacity(self.selector.keys.len());

        for input in self.selector.keys {
            for tuple in input.into_tuples(self.config)? {
                let tuple = tuple.into_storage(&codec);
                predicates.push(tuple_predicate(self.config, &tuple, inverse)?);
            }
        }

        tracing::debug!(
            "Compiled {} key scope over {} with {} tuple(s)",
            if inverse { "exclusion" } else { "inclusion" },
            self.config.table,
            predicates.len()
        );

        Ok(if inverse {
            Predicate::And(predicates)
        } else {
            Predicate::Or(predicates)
        })
    }

    /// Attach the compiled predicate to the query as one grouped clause
    pub fn apply<M>(self, query: QueryBuilder<M>) -> KeyResult<QueryBuilder<M>> {
        Ok(query.where_group(self.compile()?))
    }
}

/// Predicate for a single tuple.
///
/// An empty tuple stands for a row without identifying values and matches
/// NULL in every key column (or, when excluding, anything else).
fn tuple_predicate(config: &KeyConfig, tuple: &KeyTuple, inverse: bool) -> KeyResult<Predicate> {
    if tuple.is_empty() {
        let columns = config.key_columns.iter().map(|column| config.qualify_column(column));
        return Ok(if inverse {
            Predicate::Or(columns.map(|c| Predicate::is_not_null(&c)).collect())
        } else {
            Predicate::And(columns.map(|c| Predicate::is_null(&c)).collect())
        });
    }

    let mut conditions = Vec::with_capacity(config.key_len());
    for column in &config.key_columns {
        let value = tuple.require(column)?.clone();
        let qualified = config.qualify_column(column);
        conditions.push(if inverse {
            Predicate::ne(&qualified, value)
        } else {
            Predicate::eq(&qualified, value)
        });
    }

    Ok(if inverse {
        Predicate::Or(conditions)
    } else {
        Predicate::And(conditions)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyError;
    use crate::value::KeyValue;

    fn memberships() -> KeyConfig {
        KeyConfig::new("memberships", ["org_id", "user_id"])
    }

    fn pair(org: i64, user: i64) -> KeyTuple {
        KeyTuple::new().with("org_id", org).with("user_id", user)
    }

    #[test]
    fn test_inclusion_sql() {
        let config = memberships();
        let scope = CompositeKeyScope::new(&config, KeySelector::include([pair(1, 5), pair(2, 9)]));
        let query: QueryBuilder = scope.apply(QueryBuilder::new().from("memberships")).unwrap();

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM memberships WHERE \
             ((memberships.org_id = 1 AND memberships.user_id = 5) OR \
             (memberships.org_id = 2 AND memberships.user_id = 9))"
        );
    }

    #[test]
    fn test_exclusion_sql() {
        let config = memberships();
        let scope = CompositeKeyScope::new(&config, KeySelector::exclude([pair(1, 5), pair(2, 9)]));
        let query: QueryBuilder = scope
            .apply(QueryBuilder::new().from("memberships").where_eq("active", true))
            .unwrap();

        assert_eq!(
            query.to_sql(),
            "SELECT * FROM memberships WHERE active = true AND \
             ((memberships.org_id != 1 OR memberships.user_id != 5) AND \
             (memberships.org_id != 2 OR memberships.user_id != 9))"
        );
    }

    #[test]
    fn test_normalized_keys_are_decoded() {
        let config = memberships();
        let predicate = CompositeKeyScope::new(&config, KeySelector::include(["1___5"]))
            .compile()
            .unwrap();

        assert!(predicate.matches(&pair(1, 5)));
        assert!(!predicate.matches(&pair(1, 6)));
    }

    #[test]
    fn test_missing_column_names_column() {
        let config = memberships();
        let tuple = KeyTuple::new().with("org_id", 1);
        let err = CompositeKeyScope::new(&config, KeySelector::include([tuple]))
            .compile()
            .unwrap_err();

        match err {
            KeyError::MissingKeyValue { column, record } => {
                assert_eq!(column, "user_id");
                assert!(record.contains("org_id"));
            }
            other => panic!("expected missing key value, got {:?}", other),
        }
    }

    #[test]
    fn test_entity_without_key_is_missing_not_null() {
        let config = memberships();
        let mut unsaved = std::collections::HashMap::new();
        unsaved.insert("role".to_string(), KeyValue::from("admin"));

        let selector = KeySelector::include([KeyInput::entity(&unsaved)]);
        let err = CompositeKeyScope::new(&config, selector)
            .apply(QueryBuilder::<()>::new().delete_from("memberships"))
            .unwrap_err();
        assert_eq!(err.column(), Some("org_id"));

        let selector = KeySelector::exclude([KeyInput::entity(&unsaved)]);
        let err = CompositeKeyScope::new(&config, selector)
            .compile()
            .unwrap_err();
        assert!(matches!(err, KeyError::MissingKeyValue { .. }));
    }

    #[test]
    fn test_invalid_declaration_is_rejected() {
        let config = KeyConfig::new("memberships", ["org_id", "org_id"]);
        let err = CompositeKeyScope::new(&config, KeySelector::include([pair(1, 5)]))
            .compile()
            .unwrap_err();
        assert!(matches!(err, KeyError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_tuple_matches_nulls() {
        let config = memberships();
        let predicate = CompositeKeyScope::new(&config, KeySelector::include([KeyTuple::new()]))
            .compile()
            .unwrap();

        assert_eq!(
            predicate,
            Predicate::Or(vec![Predicate::And(vec![
                Predicate::is_null("memberships.org_id"),
                Predicate::is_null("memberships.user_id"),
            ])])
        );

        let anonymous = KeyTuple::new()
            .with("org_id", KeyValue::Null)
            .with("user_id", KeyValue::Null);
        assert!(predicate.matches(&anonymous));
        assert!(!predicate.matches(&pair(1, 5)));
    }

    #[test]
    fn test_empty_selectors() {
        let config = memberships();

        let include = CompositeKeyScope::new(&config, KeySelector::include(Vec::<KeyTuple>::new()))
            .compile()
            .unwrap();
        assert!(!include.matches(&pair(1, 5)));

        let exclude = CompositeKeyScope::new(&config, KeySelector::exclude(Vec::<KeyTuple>::new()))
            .compile()
            .unwrap();
        assert!(exclude.matches(&pair(1, 5)));
    }

    #[test]
    fn test_binary_columns_are_recovered() {
        let config = KeyConfig::new("tokens", ["org_id", "token"]).with_binary_columns(["token"]);
        let tuple = KeyTuple::new().with("org_id", 1).with("token", "ABCD");
        let predicate = CompositeKeyScope::new(&config, KeySelector::include([tuple]))
            .compile()
            .unwrap();

        assert_eq!(
            predicate,
            Predicate::Or(vec![Predicate::And(vec![
                Predicate::eq("tokens.org_id", KeyValue::Integer(1)),
                Predicate::eq("tokens.token", KeyValue::Bytes(vec![0xab, 0xcd])),
            ])])
        );

        let from_key = CompositeKeyScope::new(&config, KeySelector::include(["1___ABCD"]))
            .compile()
            .unwrap();
        let row = KeyTuple::new().with("org_id", 1).with("token", vec![0xabu8, 0xcd]);
        assert!(from_key.matches(&row));
    }
}
