//! Query Builder Module - predicate trees and the statements they restrict

pub mod builder;
pub mod dml;
pub mod predicate;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use predicate::Predicate;
pub use types::{QueryOperator, QueryType, SetClause, WhereCondition};
