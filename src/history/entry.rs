//! History entry type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geoip::GeoRecord;

/// One recorded lookup.
///
/// `ip` is the address that was searched and serves as the deduplication key
/// (exact, case-sensitive match).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ip: String,
    pub data: GeoRecord,
    pub when: DateTime<Utc>,
}

impl HistoryEntry {
    /// Entry captured now.
    pub fn new(ip: impl Into<String>, data: GeoRecord) -> Self {
        Self::captured_at(ip, data, Utc::now())
    }

    /// Entry with an explicit capture time.
    pub fn captured_at(ip: impl Into<String>, data: GeoRecord, when: DateTime<Utc>) -> Self {
        Self {
            ip: ip.into(),
            data,
            when,
        }
    }
}
