//! Session state machine.

use std::fmt;
use std::sync::Arc;

use crate::geoip::GeoRecord;

/// Lookup state of a session.
///
/// `LookingUp` is entered on every dispatch; it ends in `Ready` or `Error`.
/// A new dispatch is accepted in any state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing dispatched yet
    Idle,
    /// A lookup is in flight
    LookingUp,
    /// The latest lookup succeeded
    Ready(Arc<GeoRecord>),
    /// The latest search was rejected or its lookup failed
    Error(String),
}

impl SessionState {
    pub fn is_looking_up(&self) -> bool {
        matches!(self, SessionState::LookingUp)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SessionState::Error(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => f.write_str("idle"),
            SessionState::LookingUp => f.write_str("looking up"),
            SessionState::Ready(record) => match record.ip.as_deref() {
                Some(ip) => write!(f, "ready ({ip})"),
                None => f.write_str("ready"),
            },
            SessionState::Error(message) => write!(f, "error: {message}"),
        }
    }
}
