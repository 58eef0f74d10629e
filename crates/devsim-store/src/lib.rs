//! Storage layer: one JSON document per snapshot in a directory.

mod error;
mod snapshots;

pub use error::StoreError;
pub use snapshots::SnapshotStore;
