//! Geolocation data structures.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a lookup should resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    /// The caller's own public address, resolved by the provider
    SelfAddress,
    /// A specific, already validated address
    Address(String),
}

impl LookupTarget {
    /// The explicit address, if any.
    pub fn address(&self) -> Option<&str> {
        match self {
            LookupTarget::SelfAddress => None,
            LookupTarget::Address(ip) => Some(ip),
        }
    }
}

impl fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupTarget::SelfAddress => f.write_str("self"),
            LookupTarget::Address(ip) => f.write_str(ip),
        }
    }
}

/// Result of one geolocation lookup.
///
/// Every known field is optional since providers omit what they don't know.
/// Unknown fields are kept verbatim in `extra` for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// `"latitude,longitude"`, possibly malformed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Provider fields this crate doesn't interpret (postal, timezone, hostname, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl GeoRecord {
    /// "City, Region, Country" using whichever parts are present.
    pub fn place(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
