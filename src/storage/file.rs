//! File-backed store.
//!
//! Each slot is one JSON file named after its key inside a directory.

use std::ffi::OsString;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{decode_slot, Store};
use crate::error_handling::StoreError;

/// JSON file holding a single value.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Store for slot `key` inside `dir` (`<dir>/<key>.json`).
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self::at_path(dir.as_ref().join(format!("{key}.json")))
    }

    /// Store backed by exactly `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _value: PhantomData,
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<T> Store<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>, StoreError> {
        if !self.path.exists() {
            debug!("Store file {} does not exist yet", self.path.display());
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(StoreError::Read)?;
        decode_slot(&content)
    }

    fn save(&self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }
        let content = serde_json::to_string_pretty(value).map_err(StoreError::Serialize)?;
        // write next to the slot, then swap it in; the old slot survives a failed write
        let staging = self.staging_path();
        std::fs::write(&staging, content).map_err(StoreError::Write)?;
        if let Err(e) = std::fs::rename(&staging, &self.path) {
            let _ = std::fs::remove_file(&staging);
            return Err(StoreError::Write(e));
        }
        Ok(())
    }
}
