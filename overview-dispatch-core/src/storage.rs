//! Key/value storage abstraction handed to stores as a collaborator

use std::collections::BTreeMap;
use std::fmt::Debug;

use parking_lot::Mutex;
use serde_json::Value;

/// Persistent key/value storage (browser-style local storage).
pub trait Storage: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str);
    fn clear(&self);
}

/// A call made against a [`MemoryStorage`].
#[derive(Debug, Clone, PartialEq)]
pub enum StorageCall {
    Get(String),
    Set(String, Value),
    Remove(String),
    Clear,
}

/// In-memory [`Storage`] that records every call, for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<MemoryStorageInner>,
}

#[derive(Debug, Default)]
struct MemoryStorageInner {
    entries: BTreeMap<String, Value>,
    calls: Vec<StorageCall>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StorageCall> {
        self.inner.lock().calls.clone()
    }

    /// Snapshot of the stored entries.
    pub fn entries(&self) -> BTreeMap<String, Value> {
        self.inner.lock().entries.clone()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.lock();
        inner.calls.push(StorageCall::Get(key.to_string()));
        inner.entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let mut inner = self.inner.lock();
        inner.calls.push(StorageCall::Set(key.to_string(), value.clone()));
        inner.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut inner = self.inner.lock();
        inner.calls.push(StorageCall::Remove(key.to_string()));
        inner.entries.remove(key);
    }

    fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.calls.push(StorageCall::Clear);
        inner.entries.clear();
    }
}
