//! Durable key-value slots.
//!
//! A [`Store`] holds one serialized value. Components that persist state take
//! a store by injection so tests can swap in [`MemoryStore`] and the binary can
//! use [`JsonFileStore`].

mod file;
mod memory;

use std::sync::Arc;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error_handling::StoreError;

/// A single durable slot holding a value of type `T`.
///
/// Reads and writes are whole-value: there are no partial or append writes.
pub trait Store<T> {
    /// Reads the slot.
    ///
    /// Returns `Ok(None)` when the slot is missing, empty, or holds `null`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` if the slot holds unparsable data and
    /// `StoreError::Read` if it cannot be read at all.
    fn load(&self) -> Result<Option<T>, StoreError>;

    /// Replaces the slot contents with `value`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write`, `StoreError::Serialize`, or
    /// `StoreError::Unavailable` if the value was not persisted.
    fn save(&self, value: &T) -> Result<(), StoreError>;
}

impl<T, S> Store<T> for Arc<S>
where
    S: Store<T> + ?Sized,
{
    fn load(&self) -> Result<Option<T>, StoreError> {
        (**self).load()
    }

    fn save(&self, value: &T) -> Result<(), StoreError> {
        (**self).save(value)
    }
}

/// Parses slot text, treating blank text and `null` as an absent value.
pub(crate) fn decode_slot<T>(text: &str) -> Result<Option<T>, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<T>>(text).map_err(StoreError::Corrupt)
}
