//! Lookup dispatch bookkeeping.

use std::sync::Arc;

use crate::error_handling::LookupError;
use crate::geoip::{GeoLocator, GeoRecord, LookupTarget};

/// Why a lookup was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrigin {
    /// Self-lookup at startup or after clearing the search; never recorded
    Automatic,
    /// User-initiated search; recorded to history on success
    Manual,
}

/// A dispatched lookup that has not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    seq: u64,
    target: LookupTarget,
    origin: LookupOrigin,
}

impl PendingLookup {
    pub(crate) fn new(seq: u64, target: LookupTarget, origin: LookupOrigin) -> Self {
        Self {
            seq,
            target,
            origin,
        }
    }

    /// Dispatch sequence number; higher is newer.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn target(&self) -> &LookupTarget {
        &self.target
    }

    pub fn origin(&self) -> LookupOrigin {
        self.origin
    }

    /// Performs the lookup (one attempt) and pairs the result with this dispatch.
    pub async fn resolve<L: GeoLocator>(self, locator: &L) -> LookupOutcome {
        let result = locator.locate(&self.target).await;
        LookupOutcome::new(self, result)
    }
}

/// A resolved lookup, ready to be applied to the session that dispatched it.
#[derive(Debug)]
pub struct LookupOutcome {
    lookup: PendingLookup,
    result: Result<GeoRecord, LookupError>,
}

impl LookupOutcome {
    /// Pairs a result obtained elsewhere with its dispatch.
    pub fn new(lookup: PendingLookup, result: Result<GeoRecord, LookupError>) -> Self {
        Self { lookup, result }
    }

    pub fn lookup(&self) -> &PendingLookup {
        &self.lookup
    }

    pub fn result(&self) -> &Result<GeoRecord, LookupError> {
        &self.result
    }

    pub(crate) fn into_parts(self) -> (PendingLookup, Result<GeoRecord, LookupError>) {
        (self.lookup, self.result)
    }
}

/// What applying an outcome did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// The record is now the current one
    Current(Arc<GeoRecord>),
    /// The lookup failed; the message is the session's error
    Failed(String),
    /// A newer dispatch exists; the outcome was discarded
    Stale,
}

impl Applied {
    /// The new current record, if this outcome produced one.
    pub fn record(&self) -> Option<&Arc<GeoRecord>> {
        match self {
            Applied::Current(record) => Some(record),
            _ => None,
        }
    }
}
