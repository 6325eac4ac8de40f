//! ip_locator library: IP geolocation lookups with a durable lookup history
//!
//! This library resolves IPv4/IPv6 addresses (or the caller's own address)
//! through an ipinfo-style HTTP provider, keeps a deduplicated, bounded,
//! newest-first history of manual lookups in a durable slot, and drives a map
//! surface (viewport, marker, popup, precision overlay) from the current
//! result.
//!
//! # Example
//!
//! ```no_run
//! use ip_locator::{Config, HistoryStore, IpInfoClient, JsonFileStore, Session};
//! use ip_locator::config::HISTORY_SLOT_KEY;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let locator = IpInfoClient::from_config(&config)?;
//! let history = HistoryStore::open(JsonFileStore::new(&config.history_dir, HISTORY_SLOT_KEY));
//!
//! let mut session = Session::new(locator, history);
//! session.start().await;
//! session.search("8.8.8.8").await?;
//! println!("{} entries in history", session.history().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Lookups are async and expect a Tokio runtime. Use `#[tokio::main]` in your
//! application or call library functions within an async context.

pub mod app;
pub mod config;
mod error_handling;
mod geoip;
mod history;
pub mod initialization;
mod map;
mod session;
mod storage;
mod validate;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{InitializationError, LookupError, StoreError, ValidationError};
pub use geoip::{GeoLocator, GeoRecord, IpInfoClient, LookupTarget};
pub use history::{HistoryEntry, HistoryStore, HistoryUpdate};
pub use map::{
    parse_loc, CommandQueue, Coordinates, MapCommand, MapSurface, MapSynchronizer, PopupContent,
    PopupLine,
};
pub use session::{
    Applied, LookupOrigin, LookupOutcome, PendingLookup, SelectionSet, Session, SessionState,
};
pub use storage::{JsonFileStore, MemoryStore, Store};
pub use validate::{classify, parse_address, AddressKind};
