//! Persisted custom order: storage, reconciliation against the live tree,
//! vault event tracking and read-only queries.

pub mod query;
pub mod reconcile;
pub mod store;
pub mod tracker;

pub use query::{flatten_paths, items_between, sort_by_custom_order};
pub use reconcile::{merge_saved_order, reconcile, snapshot};
pub use store::{MoveOutcome, OrderStore};
