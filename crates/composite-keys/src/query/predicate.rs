//! Predicate Tree - immutable boolean predicates over named columns
//!
//! Predicates are built as plain values and handed to the query builder for
//! rendering. They can also be evaluated against in-memory rows with the same
//! NULL handling SQL applies: a comparison involving NULL never holds.

use crate::model::AttributeSource;
use crate::value::KeyValue;

use super::types::{QueryOperator, WhereCondition};

/// Boolean predicate tree
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    True,
    False,
    Condition(WhereCondition),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: &str, value: KeyValue) -> Self {
        Predicate::Condition(WhereCondition::compare(column, QueryOperator::Equal, value))
    }

    pub fn ne(column: &str, value: KeyValue) -> Self {
        Predicate::Condition(WhereCondition::compare(column, QueryOperator::NotEqual, value))
    }

    pub fn is_null(column: &str) -> Self {
        Predicate::Condition(WhereCondition::null_check(column, QueryOperator::IsNull))
    }

    pub fn is_not_null(column: &str) -> Self {
        Predicate::Condition(WhereCondition::null_check(column, QueryOperator::IsNotNull))
    }

    pub fn in_list(column: &str, values: Vec<KeyValue>) -> Self {
        Predicate::Condition(WhereCondition::list(column, QueryOperator::In, values))
    }

    pub fn not_in_list(column: &str, values: Vec<KeyValue>) -> Self {
        Predicate::Condition(WhereCondition::list(column, QueryOperator::NotIn, values))
    }

    /// Number of leaf conditions in the tree
    pub fn condition_count(&self) -> usize {
        match self {
            Predicate::True | Predicate::False => 0,
            Predicate::Condition(_) => 1,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::condition_count).sum()
            }
        }
    }

    /// Evaluate the predicate against a row.
    ///
    /// Qualified column references (`table.column`) fall back to the bare
    /// column name when the row does not carry the qualified one.
    pub fn matches<R: AttributeSource + ?Sized>(&self, row: &R) -> bool {
        match self {
            Predicate::True => true,
            Predicate::False => false,
            Predicate::Condition(condition) => condition_holds(row, condition),
            Predicate::And(children) => children.iter().all(|child| child.matches(row)),
            Predicate::Or(children) => children.iter().any(|child| child.matches(row)),
        }
    }
}

fn lookup<R: AttributeSource + ?Sized>(row: &R, column: &str) -> Option<KeyValue> {
    row.attribute(column).or_else(|| {
        column
            .rsplit_once('.')
            .and_then(|(_, bare)| row.attribute(bare))
    })
}

fn condition_holds<R: AttributeSource + ?Sized>(row: &R, condition: &WhereCondition) -> bool {
    let actual = lookup(row, &condition.column).unwrap_or(KeyValue::Null);

    match condition.operator {
        QueryOperator::IsNull => actual.is_null(),
        QueryOperator::IsNotNull => !actual.is_null(),
        QueryOperator::Equal => condition
            .value
            .as_ref()
            .map(|expected| actual.sql_eq(expected))
            .unwrap_or(false),
        QueryOperator::NotEqual => condition
            .value
            .as_ref()
            .map(|expected| !actual.is_null() && !expected.is_null() && !actual.sql_eq(expected))
            .unwrap_or(false),
        QueryOperator::In => condition.values.iter().any(|v| actual.sql_eq(v)),
        QueryOperator::NotIn => {
            !actual.is_null()
                && condition.values.iter().all(|v| !v.is_null() && !actual.sql_eq(v))
        }
    }
}
