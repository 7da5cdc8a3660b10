//! Key-value persistence seam and best-effort JSON helpers.
//!
//! Every persisted value is one JSON document under one key. Reads that fail
//! or do not decode fall back to the caller's default; writes that fail are
//! logged and dropped.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

/// String key-value store, shaped like browser local storage.
pub trait KeyValueStore {
    type Error: std::error::Error + 'static;

    /// Read the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write the raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;
}

/// Decode the value under `key`, or `default()` when absent or unreadable.
pub fn load_or_default<S, T>(store: &S, key: &str, default: impl FnOnce() -> T) -> T
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    match store.get_item(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            log::warn!("discarding undecodable value for {key}: {err}");
            default()
        }),
        Ok(None) => default(),
        Err(err) => {
            log::warn!("failed to read {key}: {err}");
            default()
        }
    }
}

/// Encode and store `value` under `key`. Returns `false` if nothing was written.
pub fn save_value<S, T>(store: &S, key: &str, value: &T) -> bool
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("failed to encode {key}: {err}");
            return false;
        }
    };
    match store.set_item(key, &raw) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("failed to write {key}: {err}");
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryStoreError {
    #[error("store is read-only; rejected write to {0}")]
    ReadOnly(String),
}

/// In-memory store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
    read_only: Rc<Cell<bool>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject all writes and removals until switched back.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Raw stored text, bypassing decoding.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn check_writable(&self, key: &str) -> Result<(), MemoryStoreError> {
        if self.read_only.get() {
            return Err(MemoryStoreError::ReadOnly(key.to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.check_writable(key)?;
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        self.check_writable(key)?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressState;

    #[test]
    fn missing_key_yields_default() {
        let store = MemoryStore::new();
        let step: i64 = load_or_default(&store, "ta_step", || 0);
        assert_eq!(step, 0);
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let store = MemoryStore::new();
        store.set_item("ta_progress", "{not json").unwrap();
        let progress: ProgressState = load_or_default(&store, "ta_progress", ProgressState::default);
        assert_eq!(progress, ProgressState::default());
        store.set_item("ta_focus", "\"yes\"").unwrap();
        let focus: bool = load_or_default(&store, "ta_focus", || false);
        assert!(!focus);
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = MemoryStore::new();
        assert!(save_value(&store, "ta_colorName", "Sunset"));
        assert_eq!(store.raw("ta_colorName").as_deref(), Some("\"Sunset\""));
        let name: String = load_or_default(&store, "ta_colorName", String::new);
        assert_eq!(name, "Sunset");
    }

    #[test]
    fn read_only_store_drops_writes() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        assert!(!save_value(&store, "ta_focus", &true));
        assert!(store.is_empty());
        assert_eq!(
            store.remove_item("ta_focus"),
            Err(MemoryStoreError::ReadOnly("ta_focus".to_string()))
        );
        store.set_read_only(false);
        assert!(save_value(&store, "ta_focus", &true));
        assert_eq!(store.keys(), vec!["ta_focus"]);
    }

    #[test]
    fn clones_share_contents() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.set_item("k", "1").unwrap();
        assert_eq!(store.len(), 1);
        store.remove_item("k").unwrap();
        assert!(other.is_empty());
    }
}
