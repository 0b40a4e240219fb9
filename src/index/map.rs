//! Index implementation
//!
//! HashMap-based index sized from the table's capacity hint.

use std::collections::HashMap;

use bytes::Bytes;

use super::IndexEntry;

/// In-memory key index
#[derive(Debug, Default)]
pub struct Index {
    entries: HashMap<Vec<u8>, IndexEntry>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Look up the entry for a key
    pub fn get(&self, key: &[u8]) -> Option<&IndexEntry> {
        self.entries.get(key)
    }

    /// Look up just the value for a key
    pub fn value(&self, key: &[u8]) -> Option<Bytes> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or replace the entry for a key, returning the previous one
    pub fn insert(&mut self, key: Vec<u8>, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(key, entry)
    }

    /// Put back an entry displaced by a failed overwrite
    pub fn restore(&mut self, key: &[u8], previous: IndexEntry) {
        if let Some(entry) = self.entries.get_mut(key) {
            *entry = previous;
        } else {
            self.entries.insert(key.to_vec(), previous);
        }
    }

    /// Whether `key` has an entry
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all keys (arbitrary order)
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(|k| k.as_slice())
    }

    /// Iterate over all keys with their entries (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &IndexEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }
}
