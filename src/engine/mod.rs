//! This module provides the key/value storage engine used by the dispatcher.
//!
//! Engines are deliberately *not* thread-safe: mutating methods take `&mut self` and the
//! [`Dispatcher`](crate::Dispatcher) is the only owner, guarding the engine with a single lock.

/// A trait for the basic functionality of a key/value storage engine
pub trait KvsEngine: Send + 'static {
    /// puts a `key` and `value`
    ///
    /// If the given `key` already exists the previous `value` will be overwritten.
    fn put(&mut self, key: String, value: String);

    /// Gets the value associated with the given `key`
    ///
    /// Returns `None` if the given `key` does not exist.
    fn get(&self, key: &str) -> Option<String>;

    /// Deletes the given `key` (and associated value) from the store.
    ///
    /// Deleting a key that does not exist is a no-op.
    fn delete(&mut self, key: &str);

    /// number of entries currently held
    fn len(&self) -> usize;

    /// returns `true` if the engine holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod memory;

pub use self::memory::MemStore;
