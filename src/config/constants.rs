//! Configuration constants.
//!
//! This module defines the constants shared by the history store, the map
//! synchronizer and the geolocation client.

// History persistence
/// Maximum number of entries kept in the lookup history.
/// Inserting beyond this drops the oldest entries.
pub const HISTORY_CAPACITY: usize = 50;
/// Name of the durable slot holding the history.
/// Version-tagged so an incompatible schema can use a new key next to this one.
pub const HISTORY_SLOT_KEY: &str = "ipHistory_v1";
/// Default directory for durable slots (relative to the working directory)
pub const DEFAULT_HISTORY_DIR: &str = ".ip_locator";

// Map rendering
/// Zoom level used whenever the viewport is centered on a lookup result
pub const DEFAULT_ZOOM: u8 = 13;
/// Radius of the precision overlay circle drawn around a located address
pub const OVERLAY_RADIUS_METERS: f64 = 1000.0;

// Geolocation provider
/// Base URL of the geolocation provider
pub const DEFAULT_PROVIDER_URL: &str = "https://ipinfo.io";
/// Environment variable holding the optional provider access token
pub const IPINFO_TOKEN_ENV: &str = "IPINFO_TOKEN";
/// Per-request timeout in seconds.
/// Lookups are attempted exactly once, so this bounds how long a dispatch can stay pending.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// TCP connection timeout in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 5;
/// User-Agent sent to the provider
pub const DEFAULT_USER_AGENT: &str = concat!("ip_locator/", env!("CARGO_PKG_VERSION"));
