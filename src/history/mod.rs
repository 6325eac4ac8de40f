//! Lookup history.
//!
//! Keeps the most recent manual lookups, newest first, with at most one entry
//! per IP and at most [`HISTORY_CAPACITY`](crate::config::HISTORY_CAPACITY)
//! entries. The sequence is read once from a durable [`Store`](crate::storage::Store)
//! when opened and rewritten in full after every mutation.

mod entry;
mod store;

// Re-export public API
pub use entry::HistoryEntry;
pub use store::{HistoryStore, HistoryUpdate};
