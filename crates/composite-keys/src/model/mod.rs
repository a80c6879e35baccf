//! Model System - what the key layer needs from an entity, and what it adds
//!
//! - `core_trait`: `AttributeSource` and `KeyedEntity`, consumed from the ORM
//! - `composite_key`: key operations every keyed entity gets for free

pub mod composite_key;
pub mod core_trait;

pub use composite_key::CompositeKey;
pub use core_trait::{AttributeSource, KeyedEntity};
