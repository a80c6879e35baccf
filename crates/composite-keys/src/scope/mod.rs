//! Scopes - restricting queries to sets of keys

pub mod apply_ids;
pub mod composite;

pub use apply_ids::apply_ids;
pub use composite::{CompositeKeyScope, KeySelector};
