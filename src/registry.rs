//! Handle-keyed state registries
//!
//! Vulkan applications may call WSI functions from several threads at once
//! as long as they use different handles. A [`SynchronizedMap`] takes its
//! lock only for the lookup, insert or remove itself and hands out an
//! `Arc<Mutex<V>>` per entry, so a present blocked on one surface's
//! compositor never stalls lookups for another.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared handle to one registry entry
pub type Entry<V> = Arc<Mutex<V>>;

/// Thread-safe map from a Vulkan handle to its state
#[derive(Debug)]
pub struct SynchronizedMap<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> Default for SynchronizedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Copy + Eq + Hash, V> SynchronizedMap<K, V> {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `value` under `key`, replacing any previous entry
    pub fn insert(&self, key: K, value: V) -> Entry<V> {
        let entry = Arc::new(Mutex::new(value));
        self.entries.lock().insert(key, Arc::clone(&entry));
        entry
    }

    /// Entry for `key`, if tracked
    pub fn get(&self, key: K) -> Option<Entry<V>> {
        self.entries.lock().get(&key).cloned()
    }

    /// Stop tracking `key`
    pub fn remove(&self, key: K) -> Option<Entry<V>> {
        self.entries.lock().remove(&key)
    }

    /// Whether `key` is tracked
    pub fn contains(&self, key: K) -> bool {
        self.entries.lock().contains_key(&key)
    }

    /// Number of tracked entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
