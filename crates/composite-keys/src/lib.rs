//! # elif-composite-keys: Composite and binary primary keys for elif.rs
//!
//! Lets the data layer treat a row identified by several columns as if it had
//! a single key, and keeps binary key columns in raw bytes in storage while
//! exposing them as uppercase hex text.
//!
//! - `key`: key tuples, normalized keys and heterogeneous key input
//! - `codec`: hex / bytes conversion for binary columns
//! - `scope`: predicates matching or excluding sets of keys
//! - `model`: the `KeyedEntity` contract and `CompositeKey` operations
//! - `relationships`: pivot statements for many-to-many relations
//! - `query`: the predicate tree and SQL-rendering query builder

pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod model;
pub mod query;
pub mod relationships;
pub mod scope;
pub mod value;

#[cfg(test)]
mod tests;

// Re-export core traits and types
pub use codec::*;
pub use config::*;
pub use error::*;
pub use key::*;
pub use model::*;
pub use query::*;
pub use relationships::*;
pub use scope::*;
pub use value::*;
