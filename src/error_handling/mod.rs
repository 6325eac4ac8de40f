//! Error types.
//!
//! Errors are grouped by where they originate:
//! - **Validation**: malformed address text, never reaches the network
//! - **Lookup**: geolocation provider failures, surfaced to the user
//! - **Store**: durable slot failures; corruption is absorbed, write failures are warnings
//! - **Initialization**: logger and HTTP client setup in the binary

mod types;

// Re-export public API
pub use types::{InitializationError, LookupError, StoreError, ValidationError};
