//! Query Builder - Core builder implementation

use std::marker::PhantomData;

use super::predicate::Predicate;
use super::types::*;

/// Query builder for constructing database queries.
///
/// Every `where_*` call appends one predicate; the predicates are ANDed
/// together when the statement is rendered.
#[derive(Debug)]
pub struct QueryBuilder<M = ()> {
    pub(crate) query_type: QueryType,
    pub(crate) select_fields: Vec<String>,
    pub(crate) from_tables: Vec<String>,
    pub(crate) insert_table: Option<String>,
    pub(crate) update_table: Option<String>,
    pub(crate) delete_table: Option<String>,
    pub(crate) set_clauses: Vec<SetClause>,
    pub(crate) where_conditions: Vec<Predicate>,
    pub(crate) limit_count: Option<i64>,
    _phantom: PhantomData<M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            query_type: self.query_type,
            select_fields: self.select_fields.clone(),
            from_tables: self.from_tables.clone(),
            insert_table: self.insert_table.clone(),
            update_table: self.update_table.clone(),
            delete_table: self.delete_table.clone(),
            set_clauses: self.set_clauses.clone(),
            where_conditions: self.where_conditions.clone(),
            limit_count: self.limit_count,
            _phantom: PhantomData,
        }
    }
}

impl<M> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QueryBuilder<M> {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            query_type: QueryType::Select,
            select_fields: Vec::new(),
            from_tables: Vec::new(),
            insert_table: None,
            update_table: None,
            delete_table: None,
            set_clauses: Vec::new(),
            where_conditions: Vec::new(),
            limit_count: None,
            _phantom: PhantomData,
        }
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Predicates currently restricting the statement
    pub fn predicates(&self) -> &[Predicate] {
        &self.where_conditions
    }

    /// Column values set for INSERT/UPDATE
    pub fn set_clauses(&self) -> &[SetClause] {
        &self.set_clauses
    }

    /// All WHERE predicates as one conjunction
    pub fn where_predicate(&self) -> Predicate {
        Predicate::And(self.where_conditions.clone())
    }
}
