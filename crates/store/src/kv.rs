//! The storage seam: a narrow key-value interface.
//!
//! The production backing store is a browser-style string store with a hard
//! quota. Keeping the interface this small lets the eviction and compression
//! logic be tested against [`MemoryStore`] instead of a real browser store.

use std::collections::HashMap;

use thiserror::Error;

/// Errors surfaced by a key-value backend.
///
/// Quota exhaustion is its own class so the save path can react to it
/// specifically; everything else is an opaque backend failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded")]
    QuotaExceeded,
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Minimal string key-value store with usage accounting.
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any existing one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing an absent key is a no-op.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Estimated bytes used: the sum of byte lengths of all keys and values.
    fn estimate_usage(&self) -> u64;
}

/// In-memory store with an optional byte capacity.
///
/// With a capacity set, writes that would push usage past it fail with
/// [`StorageError::QuotaExceeded`], mirroring a full browser store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    capacity: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once usage would exceed `capacity` bytes.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    /// Change the capacity of an existing store. Shrinking below current
    /// usage does not drop data; only later writes are affected.
    pub fn set_capacity(&mut self, capacity: Option<u64>) {
        self.capacity = capacity;
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn usage_after(&self, key: &str, value: &str) -> u64 {
        let current = self.estimate_usage();
        let existing = self
            .entries
            .get(key)
            .map(|v| (key.len() + v.len()) as u64)
            .unwrap_or(0);
        current - existing + (key.len() + value.len()) as u64
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(capacity) = self.capacity
            && self.usage_after(key, value) > capacity
        {
            return Err(StorageError::QuotaExceeded);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn estimate_usage(&self) -> u64 {
        self.entries
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum()
    }
}
