//! Capacity-bounded, deduplicated history backed by a durable slot.

use std::collections::{BTreeSet, HashSet};

use log::{debug, warn};
use tokio::sync::watch;

use super::entry::HistoryEntry;
use crate::config::HISTORY_CAPACITY;
use crate::error_handling::StoreError;
use crate::storage::Store;

/// Result of a history mutation.
///
/// The in-memory effect of a mutation always applies. `warning` carries the
/// persistence failure, if any; callers may surface it but must not treat it
/// as fatal.
#[derive(Debug)]
pub struct HistoryUpdate<'a> {
    pub entries: &'a [HistoryEntry],
    pub warning: Option<StoreError>,
}

impl HistoryUpdate<'_> {
    /// True when the new sequence reached the durable slot.
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// Newest-first lookup history over an injected store.
///
/// Invariants: no two entries share an `ip`, and the length never exceeds the
/// capacity. The store is the only writer of its slot.
pub struct HistoryStore<S> {
    store: S,
    entries: Vec<HistoryEntry>,
    capacity: usize,
    changes: watch::Sender<Vec<HistoryEntry>>,
}

impl<S> HistoryStore<S>
where
    S: Store<Vec<HistoryEntry>>,
{
    /// Opens the history, reading the durable slot once.
    pub fn open(store: S) -> Self {
        Self::open_with_capacity(store, HISTORY_CAPACITY)
    }

    /// Opens the history with a non-default capacity (at least 1).
    pub fn open_with_capacity(store: S, capacity: usize) -> Self {
        let (changes, _) = watch::channel(Vec::new());
        let mut history = Self {
            store,
            entries: Vec::new(),
            capacity: capacity.max(1),
            changes,
        };
        history.load();
        history
    }

    /// Re-reads the durable slot, replacing the in-memory sequence.
    ///
    /// A missing, empty, or unparsable slot yields an empty history; the
    /// corruption is logged and otherwise ignored. Loaded data is validated:
    /// later duplicates of an `ip`, blank `ip`s and entries beyond the
    /// capacity are dropped.
    pub fn load(&mut self) -> &[HistoryEntry] {
        let loaded = match self.store.load() {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!("Ignoring unreadable history slot: {e}");
                Vec::new()
            }
        };
        let raw_len = loaded.len();
        self.entries = sanitize(loaded, self.capacity);
        if self.entries.len() != raw_len {
            debug!(
                "Dropped {} invalid history entries on load",
                raw_len - self.entries.len()
            );
        }
        self.publish();
        &self.entries
    }

    /// Records a successful manual lookup.
    ///
    /// Any existing entry for the same `ip` is removed and `entry` goes to the
    /// front, so a re-searched address always becomes the newest entry with
    /// fresh data. The sequence is then truncated to capacity and persisted.
    pub fn record_lookup(&mut self, entry: HistoryEntry) -> HistoryUpdate<'_> {
        self.entries.retain(|existing| existing.ip != entry.ip);
        self.entries.insert(0, entry);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.len() - self.capacity;
            self.entries.truncate(self.capacity);
            debug!("Evicted {evicted} oldest history entries");
        }
        self.commit()
    }

    /// Removes the entries at `indices` (positions in the current sequence).
    ///
    /// Out-of-range indices are ignored.
    pub fn delete_indices(&mut self, indices: &BTreeSet<usize>) -> HistoryUpdate<'_> {
        if !indices.is_empty() {
            let mut position = 0;
            self.entries.retain(|_| {
                let keep = !indices.contains(&position);
                position += 1;
                keep
            });
        }
        self.commit()
    }

    /// Empties the history and the durable slot.
    pub fn clear(&mut self) -> HistoryUpdate<'_> {
        self.entries.clear();
        self.commit()
    }

    /// Current sequence, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Position of the entry for `ip`, if any.
    pub fn position(&self, ip: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.ip == ip)
    }

    /// Receives the full sequence after every load and mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<HistoryEntry>> {
        self.changes.subscribe()
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn commit(&mut self) -> HistoryUpdate<'_> {
        let warning = match self.store.save(&self.entries) {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    "Failed to persist history ({} entries kept in memory): {e}",
                    self.entries.len()
                );
                Some(e)
            }
        };
        self.publish();
        HistoryUpdate {
            entries: &self.entries,
            warning,
        }
    }

    fn publish(&self) {
        self.changes.send_replace(self.entries.clone());
    }
}

fn sanitize(entries: Vec<HistoryEntry>, capacity: usize) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    let mut kept: Vec<HistoryEntry> = entries
        .into_iter()
        .filter(|entry| !entry.ip.is_empty() && seen.insert(entry.ip.clone()))
        .collect();
    kept.truncate(capacity);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoip::GeoRecord;
    use crate::storage::MemoryStore;
    use chrono::{TimeDelta, Utc};
    use std::sync::Arc;

    fn record(city: &str) -> GeoRecord {
        GeoRecord {
            city: Some(city.to_string()),
            ..Default::default()
        }
    }

    fn entry(ip: &str) -> HistoryEntry {
        HistoryEntry::new(ip, record("Somewhere"))
    }

    fn ips(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.ip.as_str()).collect()
    }

    fn fresh() -> HistoryStore<Arc<MemoryStore<Vec<HistoryEntry>>>> {
        HistoryStore::open(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_open_empty_slot() {
        let history = fresh();
        assert!(history.is_empty());
        assert_eq!(history.capacity(), 50);
    }

    #[test]
    fn test_record_prepends() {
        let mut history = fresh();
        history.record_lookup(entry("1.1.1.1"));
        let update = history.record_lookup(entry("8.8.8.8"));
        assert_eq!(ips(update.entries), vec!["8.8.8.8", "1.1.1.1"]);
        assert!(update.is_persisted());
    }

    #[test]
    fn test_dedup_moves_to_front_with_new_data() {
        let old_time = Utc::now() - TimeDelta::days(1);
        let mut history = fresh();
        history.record_lookup(HistoryEntry::captured_at("1.1.1.1", record("Old"), old_time));
        history.record_lookup(entry("8.8.8.8"));
        history.record_lookup(entry("9.9.9.9"));
        let update = history.record_lookup(HistoryEntry::new("1.1.1.1", record("New")));

        assert_eq!(ips(update.entries), vec!["1.1.1.1", "9.9.9.9", "8.8.8.8"]);
        assert_eq!(update.entries[0].data.city.as_deref(), Some("New"));
        assert!(update.entries[0].when > old_time);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let mut history = fresh();
        history.record_lookup(entry("2001:DB8:0:0:0:0:0:1"));
        history.record_lookup(entry("2001:db8:0:0:0:0:0:1"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_eviction_keeps_most_recent_fifty() {
        let mut history = fresh();
        for i in 0..51 {
            history.record_lookup(entry(&format!("10.0.0.{i}")));
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.entries()[0].ip, "10.0.0.50");
        assert_eq!(history.entries()[49].ip, "10.0.0.1");
        assert!(history.position("10.0.0.0").is_none());
    }

    #[test]
    fn test_invariants_hold_after_many_inserts() {
        let mut history = fresh();
        for i in 0..300 {
            history.record_lookup(entry(&format!("10.0.{}.{}", i % 7, i % 61)));
            let unique: HashSet<&str> = history.entries().iter().map(|e| e.ip.as_str()).collect();
            assert_eq!(unique.len(), history.len());
            assert!(history.len() <= 50);
        }
    }

    #[test]
    fn test_delete_indices() {
        let mut history = fresh();
        history.record_lookup(entry("3.3.3.3"));
        history.record_lookup(entry("2.2.2.2"));
        history.record_lookup(entry("1.1.1.1"));

        let update = history.delete_indices(&BTreeSet::from([0, 2]));
        assert_eq!(ips(update.entries), vec!["2.2.2.2"]);
    }

    #[test]
    fn test_delete_indices_ignores_out_of_range() {
        let mut history = fresh();
        history.record_lookup(entry("1.1.1.1"));
        let update = history.delete_indices(&BTreeSet::from([5]));
        assert_eq!(ips(update.entries), vec!["1.1.1.1"]);
    }

    #[test]
    fn test_clear_empties_slot() {
        let store = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::open(Arc::clone(&store));
        history.record_lookup(entry("1.1.1.1"));

        let update = history.clear();
        assert!(update.entries.is_empty());
        assert_eq!(store.raw().as_deref(), Some("[]"));
        assert_eq!(store.load().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_every_mutation_rewrites_slot() {
        let store = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::open(Arc::clone(&store));
        history.record_lookup(entry("1.1.1.1"));
        history.record_lookup(entry("2.2.2.2"));
        history.delete_indices(&BTreeSet::from([1]));
        assert_eq!(store.write_count(), 3);

        let persisted = store.load().unwrap().unwrap();
        assert_eq!(ips(&persisted), vec!["2.2.2.2"]);
    }

    #[test]
    fn test_load_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::open(Arc::clone(&store));
        history.record_lookup(entry("1.1.1.1"));
        history.record_lookup(entry("2.2.2.2"));

        let first = history.load().to_vec();
        let second = history.load().to_vec();
        assert_eq!(first, second);
        assert_eq!(ips(&first), vec!["2.2.2.2", "1.1.1.1"]);
    }

    #[test]
    fn test_corrupt_slot_loads_empty() {
        let history = HistoryStore::open(MemoryStore::with_raw("{not json"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_blank_and_null_slots_load_empty() {
        assert!(HistoryStore::open(MemoryStore::with_raw("")).is_empty());
        assert!(HistoryStore::open(MemoryStore::with_raw("null")).is_empty());
    }

    #[test]
    fn test_load_drops_duplicates_and_excess() {
        let mut entries: Vec<HistoryEntry> = (0..60).map(|i| entry(&format!("10.1.0.{i}"))).collect();
        entries.insert(1, entry("10.1.0.0"));
        let raw = serde_json::to_string(&entries).unwrap();

        let history = HistoryStore::open(MemoryStore::with_raw(raw));
        assert_eq!(history.len(), 50);
        assert_eq!(history.entries()[0].ip, "10.1.0.0");
        assert_eq!(history.entries()[1].ip, "10.1.0.1");
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let store = Arc::new(MemoryStore::new());
        let mut history = HistoryStore::open(Arc::clone(&store));
        history.record_lookup(entry("1.1.1.1"));

        store.set_fail_writes(true);
        let update = history.record_lookup(entry("2.2.2.2"));
        assert!(!update.is_persisted());
        assert_eq!(ips(update.entries), vec!["2.2.2.2", "1.1.1.1"]);

        let persisted = store.load().unwrap().unwrap();
        assert_eq!(ips(&persisted), vec!["1.1.1.1"]);
    }

    #[test]
    fn test_subscribe_sees_mutations() {
        let mut history = fresh();
        let mut rx = history.subscribe();
        history.record_lookup(entry("1.1.1.1"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(ips(&rx.borrow_and_update()), vec!["1.1.1.1"]);

        history.clear();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_custom_capacity() {
        let mut history = HistoryStore::open_with_capacity(MemoryStore::new(), 2);
        history.record_lookup(entry("1.1.1.1"));
        history.record_lookup(entry("2.2.2.2"));
        history.record_lookup(entry("3.3.3.3"));
        assert_eq!(ips(history.entries()), vec!["3.3.3.3", "2.2.2.2"]);
    }
}
