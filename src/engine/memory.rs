use std::collections::HashMap;

use super::KvsEngine;

/// An in-memory [`KvsEngine`] backed by a `HashMap`.
///
/// Entries live from their first `put` until they are deleted or the process exits.
/// There is no eviction, no size bound and no expiry.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    map: HashMap<String, String>,
}

impl MemStore {
    /// creates an empty store
    pub fn new() -> Self {
        MemStore::default()
    }
}

impl KvsEngine for MemStore {
    fn put(&mut self, key: String, value: String) {
        self.map.insert(key, value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn delete(&mut self, key: &str) {
        self.map.remove(key);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
