//! The `history` subcommands.

use log::{debug, warn};

use crate::config::{Config, HISTORY_SLOT_KEY};
use crate::history::{HistoryEntry, HistoryStore};
use crate::session::SelectionSet;
use crate::storage::{JsonFileStore, Store};

/// Result of a history mutation.
#[derive(Debug, Clone, Default)]
pub struct HistoryReport {
    pub removed: usize,
    /// Requested addresses that were not in history.
    pub unknown: Vec<String>,
    pub remaining: Vec<HistoryEntry>,
    pub persistence_warning: Option<String>,
}

/// Opens and loads the history slot under `config.history_dir`.
pub fn open_history(config: &Config) -> HistoryStore<JsonFileStore<Vec<HistoryEntry>>> {
    HistoryStore::open(JsonFileStore::new(&config.history_dir, HISTORY_SLOT_KEY))
}

/// Loaded history, newest first.
pub fn list_history(config: &Config) -> Vec<HistoryEntry> {
    open_history(config).entries().to_vec()
}

/// Deletes the entries for `addresses` from the on-disk history.
pub fn delete_from_history(config: &Config, addresses: &[String]) -> HistoryReport {
    let mut history = open_history(config);
    remove_entries(&mut history, addresses)
}

/// Empties the on-disk history.
pub fn clear_history(config: &Config) -> HistoryReport {
    let mut history = open_history(config);
    let removed = history.len();
    let update = history.clear();
    let persistence_warning = update.warning.map(|e| e.to_string());
    if let Some(warning) = &persistence_warning {
        warn!("History clear was not saved: {warning}");
    }
    HistoryReport {
        removed,
        unknown: Vec::new(),
        remaining: update.entries.to_vec(),
        persistence_warning,
    }
}

/// Marks every address in `addresses` and commits the deletion in one write.
pub fn remove_entries<S>(history: &mut HistoryStore<S>, addresses: &[String]) -> HistoryReport
where
    S: Store<Vec<HistoryEntry>>,
{
    let mut selection = SelectionSet::default();
    let mut unknown = Vec::new();
    for address in addresses {
        let address = address.trim();
        if history.position(address).is_some() {
            selection.set(address, true);
        } else {
            debug!("{address} is not in history");
            unknown.push(address.to_string());
        }
    }

    if selection.is_empty() {
        return HistoryReport {
            removed: 0,
            unknown,
            remaining: history.entries().to_vec(),
            persistence_warning: None,
        };
    }

    let before = history.len();
    let indices = selection.indices_in(history.entries());
    let update = history.delete_indices(&indices);
    let persistence_warning = update.warning.map(|e| e.to_string());
    if let Some(warning) = &persistence_warning {
        warn!("History deletion was not saved: {warning}");
    }
    let remaining = update.entries.to_vec();
    HistoryReport {
        removed: before - remaining.len(),
        unknown,
        remaining,
        persistence_warning,
    }
}
