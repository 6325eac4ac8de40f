//! In-memory store.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{decode_slot, Store};
use crate::error_handling::StoreError;

/// Store that keeps the serialized slot text in memory.
///
/// Values go through the same JSON encoding as [`super::JsonFileStore`], so
/// raw (including corrupt) slot text can be injected with [`MemoryStore::with_raw`].
/// Writes can be made to fail with [`MemoryStore::set_fail_writes`] to simulate
/// an exhausted quota.
#[derive(Debug)]
pub struct MemoryStore<T> {
    raw: Mutex<Option<String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    _value: PhantomData<fn() -> T>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            raw: Mutex::new(None),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
            _value: PhantomData,
        }
    }
}

impl<T> MemoryStore<T> {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `raw` text, which need not be valid JSON.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::default();
        if let Ok(mut slot) = store.raw.lock() {
            *slot = Some(raw.into());
        }
        store
    }

    /// Current slot text.
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().ok().and_then(|slot| slot.clone())
    }

    /// Makes every following `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<T> Store<T> for MemoryStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>, StoreError> {
        let slot = self
            .raw
            .lock()
            .map_err(|_| StoreError::Unavailable("memory slot lock poisoned".to_string()))?;
        match slot.as_deref() {
            Some(text) => decode_slot(text),
            None => Ok(None),
        }
    }

    fn save(&self, value: &T) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        let text = serde_json::to_string(value).map_err(StoreError::Serialize)?;
        let mut slot = self
            .raw
            .lock()
            .map_err(|_| StoreError::Unavailable("memory slot lock poisoned".to_string()))?;
        *slot = Some(text);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
