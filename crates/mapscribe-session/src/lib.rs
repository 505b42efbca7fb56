//! Scene snapshots and undo history for mapscribe.

pub mod history;
pub mod snapshot;

pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use snapshot::Snapshot;
