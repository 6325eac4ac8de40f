//! Pending-deletion selection over the history.

use std::collections::BTreeSet;

use crate::history::HistoryEntry;

/// History entries marked for deletion, keyed by their `ip`.
///
/// Keying by address rather than position keeps a selection pointing at the
/// same entry when the history is reordered between marking and committing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    marked: BTreeSet<String>,
}

impl SelectionSet {
    pub fn set(&mut self, ip: &str, marked: bool) {
        if marked {
            self.marked.insert(ip.to_string());
        } else {
            self.marked.remove(ip);
        }
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.marked.contains(ip)
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.marked.iter().map(String::as_str)
    }

    /// Drops marks for addresses no longer in `entries`.
    pub fn prune(&mut self, entries: &[HistoryEntry]) {
        self.marked
            .retain(|ip| entries.iter().any(|entry| &entry.ip == ip));
    }

    /// Positions of the marked entries within `entries`.
    pub fn indices_in(&self, entries: &[HistoryEntry]) -> BTreeSet<usize> {
        entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| self.marked.contains(&entry.ip))
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoip::GeoRecord;

    fn entries(ips: &[&str]) -> Vec<HistoryEntry> {
        ips.iter()
            .map(|ip| HistoryEntry::new(*ip, GeoRecord::default()))
            .collect()
    }

    #[test]
    fn test_set_and_unset() {
        let mut selection = SelectionSet::default();
        selection.set("1.1.1.1", true);
        selection.set("2.2.2.2", true);
        selection.set("1.1.1.1", false);
        assert!(!selection.contains("1.1.1.1"));
        assert!(selection.contains("2.2.2.2"));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_indices_follow_current_order() {
        let mut selection = SelectionSet::default();
        selection.set("2.2.2.2", true);
        selection.set("9.9.9.9", true);

        let before = entries(&["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
        assert_eq!(selection.indices_in(&before), BTreeSet::from([1]));

        // Reordered: the same entry is found at its new position
        let after = entries(&["2.2.2.2", "4.4.4.4", "1.1.1.1"]);
        assert_eq!(selection.indices_in(&after), BTreeSet::from([0]));
    }

    #[test]
    fn test_prune_drops_missing() {
        let mut selection = SelectionSet::default();
        selection.set("1.1.1.1", true);
        selection.set("2.2.2.2", true);
        selection.prune(&entries(&["2.2.2.2"]));
        assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["2.2.2.2"]);
    }
}
