//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::predicate::Predicate;
use crate::value::KeyValue;

impl<M> QueryBuilder<M> {
    /// Add WHERE condition with equality
    pub fn where_eq<T>(self, column: &str, value: T) -> Self
    where
        T: Into<KeyValue>,
    {
        self.where_group(Predicate::eq(column, value.into()))
    }

    /// Add WHERE condition with not equal
    pub fn where_ne<T: Into<KeyValue>>(self, column: &str, value: T) -> Self {
        self.where_group(Predicate::ne(column, value.into()))
    }

    /// Add WHERE condition with IN
    pub fn where_in<T: Into<KeyValue>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_group(Predicate::in_list(
            column,
            values.into_iter().map(|v| v.into()).collect(),
        ))
    }

    /// Add WHERE condition with NOT IN
    pub fn where_not_in<T: Into<KeyValue>>(self, column: &str, values: Vec<T>) -> Self {
        self.where_group(Predicate::not_in_list(
            column,
            values.into_iter().map(|v| v.into()).collect(),
        ))
    }

    /// Add WHERE condition with IS NULL
    pub fn where_null(self, column: &str) -> Self {
        self.where_group(Predicate::is_null(column))
    }

    /// Add WHERE condition with IS NOT NULL
    pub fn where_not_null(self, column: &str) -> Self {
        self.where_group(Predicate::is_not_null(column))
    }

    /// Attach a whole predicate tree as a single grouped clause
    pub fn where_group(mut self, predicate: Predicate) -> Self {
        self.where_conditions.push(predicate);
        self
    }
}
