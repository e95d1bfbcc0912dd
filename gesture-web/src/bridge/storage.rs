//! `localStorage`-backed key/value store

use web_sys::Storage;

use crate::error::{EngineError, Result};
use crate::persistence::{KeyValueStore, MemoryStore};

pub enum BrowserStore {
    Local(Storage),
    /// No `window` or storage access denied (private mode, workers)
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn detect() -> Self {
        match web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            Some(storage) => BrowserStore::Local(storage),
            None => {
                tracing::warn!("localStorage unavailable; calibration will not survive a reload");
                BrowserStore::Memory(MemoryStore::new())
            }
        }
    }
}

fn storage_error(err: wasm_bindgen::JsValue) -> EngineError {
    EngineError::Storage(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            BrowserStore::Local(storage) => storage.get_item(key).map_err(storage_error),
            BrowserStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            BrowserStore::Local(storage) => storage.set_item(key, value).map_err(storage_error),
            BrowserStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match self {
            BrowserStore::Local(storage) => storage.remove_item(key).map_err(storage_error),
            BrowserStore::Memory(store) => store.remove(key),
        }
    }
}
