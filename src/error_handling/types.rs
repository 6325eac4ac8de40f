//! Error type definitions.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured provider URL cannot be used as an endpoint base.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlError(#[from] url::ParseError),
}

/// Rejected address text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The text is neither an IPv4 address nor an accepted IPv6 form.
    #[error("invalid address")]
    InvalidAddress(String),
}

/// Failures of a single geolocation lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The request could not be sent or the body could not be read.
    #[error("lookup request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The provider answered with a non-success status.
    #[error("lookup provider returned HTTP {0}")]
    Status(u16),

    /// The response body is not a JSON object we understand.
    #[error("lookup response could not be parsed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The endpoint URL could not be built from the provider base.
    #[error("invalid lookup endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// Any other locator failure (used by non-HTTP locators).
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a durable store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The slot exists but could not be read.
    #[error("failed to read store: {0}")]
    Read(#[source] std::io::Error),

    /// The slot could not be written.
    #[error("failed to write store: {0}")]
    Write(#[source] std::io::Error),

    /// The slot holds data that does not parse.
    #[error("store data is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// The value could not be serialized.
    #[error("failed to serialize store data: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The backend refused the operation (quota, read-only medium, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True when the slot held unparsable data.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::InvalidAddress("not-an-ip".to_string());
        assert_eq!(err.to_string(), "invalid address");
    }

    #[test]
    fn test_lookup_error_status_message() {
        let err = LookupError::Status(429);
        assert_eq!(err.to_string(), "lookup provider returned HTTP 429");
    }

    #[test]
    fn test_lookup_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = LookupError::from(json_err);
        assert!(matches!(err, LookupError::Decode(_)));
        assert!(err.to_string().starts_with("lookup response could not be parsed"));
    }

    #[test]
    fn test_store_error_is_corrupt() {
        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        assert!(StoreError::Corrupt(json_err).is_corrupt());
        assert!(!StoreError::Unavailable("quota exceeded".to_string()).is_corrupt());
    }

    #[test]
    fn test_store_error_write_message() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = StoreError::Write(io);
        assert_eq!(err.to_string(), "failed to write store: read-only");
    }
}
