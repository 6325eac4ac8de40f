//! Session controller.
//!
//! Orchestrates address validation, geolocation lookups, and the lookup
//! history for one user session, and owns the current result.
//!
//! Every lookup dispatch gets a sequence number. Only the outcome of the most
//! recent dispatch is applied; anything older is discarded on arrival
//! (last-dispatch-wins). Lookups are split into three steps so several can be
//! in flight without holding a borrow of the controller across an await:
//!
//! ```no_run
//! # use ip_locator::{GeoLocator, HistoryEntry, Session, Store};
//! # async fn demo<L: GeoLocator, S: Store<Vec<HistoryEntry>>>(session: &mut Session<L, S>, locator: &L) {
//! let pending = session.dispatch_search("8.8.8.8").expect("valid address");
//! let outcome = pending.resolve(locator).await;
//! session.apply(outcome);
//! # }
//! ```

mod dispatch;
mod selection;
mod state;

// Re-export public API
pub use dispatch::{Applied, LookupOrigin, LookupOutcome, PendingLookup};
pub use selection::SelectionSet;
pub use state::SessionState;

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;

use crate::error_handling::{StoreError, ValidationError};
use crate::geoip::{GeoLocator, GeoRecord, LookupTarget};
use crate::history::{HistoryEntry, HistoryStore};
use crate::storage::Store;
use crate::validate::parse_address;

/// One user session: current lookup result, input text, error state, and the
/// pending-deletion selection over the history.
pub struct Session<L, S> {
    locator: L,
    history: HistoryStore<S>,
    state: SessionState,
    current: Option<Arc<GeoRecord>>,
    input: String,
    selection: SelectionSet,
    latest_seq: u64,
    persistence_warning: Option<String>,
    current_tx: watch::Sender<Option<Arc<GeoRecord>>>,
}

impl<L, S> Session<L, S>
where
    L: GeoLocator,
    S: Store<Vec<HistoryEntry>>,
{
    /// Creates an idle session. Call [`Session::start`] to run the initial
    /// self-lookup.
    pub fn new(locator: L, history: HistoryStore<S>) -> Self {
        let (current_tx, _) = watch::channel(None);
        Self {
            locator,
            history,
            state: SessionState::Idle,
            current: None,
            input: String::new(),
            selection: SelectionSet::default(),
            latest_seq: 0,
            persistence_warning: None,
            current_tx,
        }
    }

    /// Looks up the caller's own address. The result never enters history.
    pub async fn start(&mut self) -> Applied {
        let pending = self.dispatch_self();
        self.run(pending).await
    }

    /// Validates `text` and, if it is an address, looks it up and records it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` without dispatching anything when `text` is
    /// not an accepted address; the session is then in the `Error` state.
    pub async fn search(&mut self, text: &str) -> Result<Applied, ValidationError> {
        let pending = self.dispatch_search(text)?;
        Ok(self.run(pending).await)
    }

    /// Clears the input and error, then repeats the self-lookup.
    pub async fn clear_search(&mut self) -> Applied {
        self.input.clear();
        let pending = self.dispatch_self();
        self.run(pending).await
    }

    /// Searches again for an address taken from history (no validation).
    pub async fn select_from_history(&mut self, ip: &str) -> Applied {
        let pending = self.dispatch_history(ip);
        self.run(pending).await
    }

    /// Dispatches a self-lookup.
    pub fn dispatch_self(&mut self) -> PendingLookup {
        self.dispatch(LookupTarget::SelfAddress, LookupOrigin::Automatic)
    }

    /// Sets the input to `text` and dispatches a manual lookup for it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` (and enters the `Error` state) when `text` is
    /// not an accepted address. Nothing is dispatched in that case, but any
    /// lookup still in flight is superseded so it cannot clear the error.
    pub fn dispatch_search(&mut self, text: &str) -> Result<PendingLookup, ValidationError> {
        self.input = text.to_string();
        match parse_address(text) {
            Ok(ip) => Ok(self.dispatch(LookupTarget::Address(ip), LookupOrigin::Manual)),
            Err(e) => {
                self.latest_seq += 1;
                debug!(
                    "Rejected search input {text:?}, superseding lookups before #{}",
                    self.latest_seq
                );
                self.state = SessionState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Dispatches a manual lookup for a history address.
    pub fn dispatch_history(&mut self, ip: &str) -> PendingLookup {
        self.input = ip.to_string();
        self.dispatch(LookupTarget::Address(ip.to_string()), LookupOrigin::Manual)
    }

    /// Applies a finished lookup if it belongs to the latest dispatch.
    ///
    /// A successful manual lookup also becomes the newest history entry. A
    /// failed lookup leaves the current record untouched.
    pub fn apply(&mut self, outcome: LookupOutcome) -> Applied {
        let (lookup, result) = outcome.into_parts();
        if lookup.seq() != self.latest_seq {
            debug!(
                "Discarding stale lookup #{} for {} (latest is #{})",
                lookup.seq(),
                lookup.target(),
                self.latest_seq
            );
            return Applied::Stale;
        }

        match result {
            Ok(record) => {
                let record = Arc::new(record);
                self.current = Some(Arc::clone(&record));
                self.state = SessionState::Ready(Arc::clone(&record));
                self.current_tx.send_replace(Some(Arc::clone(&record)));

                if let (LookupOrigin::Manual, Some(ip)) = (lookup.origin(), lookup.target().address()) {
                    let update = self
                        .history
                        .record_lookup(HistoryEntry::new(ip, (*record).clone()));
                    let warning = update.warning;
                    self.note_persistence(warning);
                    self.selection.prune(self.history.entries());
                }
                debug!("Applied lookup #{} for {}", lookup.seq(), lookup.target());
                Applied::Current(record)
            }
            Err(e) => {
                warn!("Lookup for {} failed: {e}", lookup.target());
                let message = e.to_string();
                self.state = SessionState::Error(message.clone());
                Applied::Failed(message)
            }
        }
    }

    /// Marks or unmarks the history entry for `ip` for deletion.
    ///
    /// Returns false (and changes nothing) when `ip` is not in history.
    pub fn select_for_deletion(&mut self, ip: &str, marked: bool) -> bool {
        if self.history.position(ip).is_none() {
            return false;
        }
        self.selection.set(ip, marked);
        true
    }

    /// Marks or unmarks the entry currently at `index`.
    ///
    /// The entry is remembered by its `ip`, so later changes to the history
    /// order cannot redirect the selection to another entry.
    pub fn select_index_for_deletion(&mut self, index: usize, marked: bool) -> bool {
        match self.history.entries().get(index) {
            Some(entry) => {
                let ip = entry.ip.clone();
                self.selection.set(&ip, marked);
                true
            }
            None => false,
        }
    }

    /// Deletes every marked entry and clears the selection.
    pub fn commit_deletion(&mut self) -> &[HistoryEntry] {
        let indices = self.selection.indices_in(self.history.entries());
        self.selection.clear();
        debug!("Deleting {} history entries", indices.len());
        let update = self.history.delete_indices(&indices);
        let warning = update.warning;
        self.note_persistence(warning);
        self.history.entries()
    }

    /// Empties the history and clears the selection.
    pub fn clear_all_history(&mut self) -> &[HistoryEntry] {
        self.selection.clear();
        let update = self.history.clear();
        let warning = update.warning;
        self.note_persistence(warning);
        self.history.entries()
    }

    /// Re-reads history from its durable slot. The selection is cleared since
    /// the sequence is replaced wholesale.
    pub fn reload_history(&mut self) -> &[HistoryEntry] {
        self.selection.clear();
        self.history.load()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Latest successfully applied record, kept across later failures.
    pub fn current(&self) -> Option<&Arc<GeoRecord>> {
        self.current.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Message of the `Error` state, if in it.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Last persistence failure, cleared by the next successful write.
    pub fn persistence_warning(&self) -> Option<&str> {
        self.persistence_warning.as_deref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_selected(&self, ip: &str) -> bool {
        self.selection.contains(ip)
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Receives every newly applied current record.
    pub fn subscribe_current(&self) -> watch::Receiver<Option<Arc<GeoRecord>>> {
        self.current_tx.subscribe()
    }

    /// Receives the history sequence after every change.
    pub fn subscribe_history(&self) -> watch::Receiver<Vec<HistoryEntry>> {
        self.history.subscribe()
    }

    fn dispatch(&mut self, target: LookupTarget, origin: LookupOrigin) -> PendingLookup {
        self.latest_seq += 1;
        self.state = SessionState::LookingUp;
        debug!("Dispatching lookup #{} for {target}", self.latest_seq);
        PendingLookup::new(self.latest_seq, target, origin)
    }

    async fn run(&mut self, pending: PendingLookup) -> Applied {
        let outcome = pending.resolve(&self.locator).await;
        self.apply(outcome)
    }

    fn note_persistence(&mut self, warning: Option<StoreError>) {
        self.persistence_warning = warning.map(|e| e.to_string());
    }
}
