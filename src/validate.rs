//! IP address classification.
//!
//! Classifies free-form text as an IPv4 address, an accepted IPv6 form, or
//! invalid. IPv6 acceptance is narrow: only the full eight-group
//! form and the `::1` loopback are recognised. Other compressed forms such as
//! `2001:db8::1` classify as [`AddressKind::Invalid`].

use std::sync::LazyLock;

use regex::Regex;
use strum_macros::{Display, EnumIter};

use crate::error_handling::ValidationError;

/// Four decimal octets in [0,255], no leading zeros.
static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])(\.(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])){3}$")
        .expect("Failed to compile IPv4 pattern - this is a bug")
});

/// Eight colon-separated groups of one to four hex digits.
static IPV6_FULL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$")
        .expect("Failed to compile IPv6 pattern - this is a bug")
});

const IPV6_LOOPBACK: &str = "::1";

/// Result of classifying an address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AddressKind {
    /// Dotted-quad IPv4 address
    #[strum(serialize = "IPv4")]
    Ipv4,
    /// Full-form IPv6 address or `::1`
    #[strum(serialize = "IPv6")]
    Ipv6,
    /// Anything else, including empty input
    #[strum(serialize = "invalid")]
    Invalid,
}

impl AddressKind {
    /// True for [`AddressKind::Ipv4`] and [`AddressKind::Ipv6`].
    pub fn is_valid(self) -> bool {
        !matches!(self, AddressKind::Invalid)
    }
}

/// Classifies `text` after trimming surrounding whitespace.
///
/// Never fails; unrecognised input is [`AddressKind::Invalid`].
pub fn classify(text: &str) -> AddressKind {
    let candidate = text.trim();
    if candidate.is_empty() {
        return AddressKind::Invalid;
    }
    if IPV4_PATTERN.is_match(candidate) {
        AddressKind::Ipv4
    } else if candidate == IPV6_LOOPBACK || IPV6_FULL_PATTERN.is_match(candidate) {
        AddressKind::Ipv6
    } else {
        AddressKind::Invalid
    }
}

/// Returns the trimmed address when `text` classifies as IPv4 or IPv6.
///
/// # Errors
///
/// Returns `ValidationError::InvalidAddress` carrying the original text otherwise.
pub fn parse_address(text: &str) -> Result<String, ValidationError> {
    if classify(text).is_valid() {
        Ok(text.trim().to_string())
    } else {
        Err(ValidationError::InvalidAddress(text.to_string()))
    }
}
