use crate::domain::{
    errors::StorageError,
    logging::{LogComponent, get_logger},
    telemetry::KeyValueStore,
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// `window.localStorage`
#[derive(Debug, Clone)]
pub struct BrowserLocalStorage {
    storage: web_sys::Storage,
}

impl BrowserLocalStorage {
    pub fn new() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserLocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::WriteFailed { key: key.to_string(), reason: format!("{:?}", e) })
    }

    fn remove_item(&mut self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            get_logger().warn(LogComponent::Infrastructure("LocalStorage"), &format!("⚠️ Failed to remove '{}': {:?}", key, e));
        }
    }
}

/// In-memory store. Clones share the same entries, so a test can keep a
/// handle while the sync engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store.entries.borrow_mut().extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    /// A store whose writes always fail, like a full quota
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::WriteFailed { key: key.to_string(), reason: "store is read-only".to_string() });
        }
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}
