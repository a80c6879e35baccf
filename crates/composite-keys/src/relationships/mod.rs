//! Relationships - key-aware many-to-many pivot handling

pub mod belongs_to_many;
pub mod pivot;

pub use belongs_to_many::CompositeBelongsToMany;
pub use pivot::{PivotConfig, PivotRecord, SyncChanges};
