//! Geolocation lookups.
//!
//! This module defines the [`GeoLocator`] capability consumed by the session
//! controller, the [`GeoRecord`] it produces, and [`IpInfoClient`], an HTTP
//! adapter for an ipinfo-style provider. Each call is a single attempt; there
//! is no retry.

mod client;
mod types;

// Re-export public API
pub use client::IpInfoClient;
pub use types::{GeoRecord, LookupTarget};

use std::future::Future;

use crate::error_handling::LookupError;

/// Something that can resolve a [`LookupTarget`] to a [`GeoRecord`].
///
/// Implementations make exactly one attempt per call.
pub trait GeoLocator {
    /// Looks up `target`.
    ///
    /// # Errors
    ///
    /// Returns a `LookupError` on network failure, a non-success response, or an
    /// unparsable response body.
    fn locate(
        &self,
        target: &LookupTarget,
    ) -> impl Future<Output = Result<GeoRecord, LookupError>> + Send;
}
