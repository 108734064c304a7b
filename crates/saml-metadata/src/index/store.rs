//! Storage for one secondary index.

use std::sync::Arc;

use dashmap::DashMap;

use super::MetadataIndexKey;
use crate::types::EntityDescriptor;

/// Concurrent multimap from index key to the descriptors stored under it.
///
/// A descriptor is stored at most once per key; identity is the `Arc`
/// pointer, not the entity ID, so distinct descriptors with the same
/// entity ID are kept side by side.
#[derive(Debug, Default)]
pub struct MetadataIndexStore {
    entries: DashMap<MetadataIndexKey, Vec<Arc<EntityDescriptor>>>,
}

impl MetadataIndexStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `descriptor` under `key`.
    pub fn add(&self, key: MetadataIndexKey, descriptor: Arc<EntityDescriptor>) {
        let mut slot = self.entries.entry(key).or_default();
        if !slot.iter().any(|d| Arc::ptr_eq(d, &descriptor)) {
            slot.push(descriptor);
        }
    }

    /// Removes `descriptor` from `key`. Keys left empty are dropped.
    pub fn remove(&self, key: &MetadataIndexKey, descriptor: &Arc<EntityDescriptor>) {
        self.entries.remove_if_mut(key, |_, slot| {
            slot.retain(|d| !Arc::ptr_eq(d, descriptor));
            slot.is_empty()
        });
    }

    /// Removes everything stored under `key`.
    pub fn clear_key(&self, key: &MetadataIndexKey) {
        self.entries.remove(key);
    }

    /// Removes everything.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns a snapshot of the descriptors stored under `key`; empty if
    /// there are none.
    #[must_use]
    pub fn lookup(&self, key: &MetadataIndexKey) -> Vec<Arc<EntityDescriptor>> {
        self.entries
            .get(key)
            .map(|slot| slot.clone())
            .unwrap_or_default()
    }

    /// Returns all keys currently in use.
    #[must_use]
    pub fn keys(&self) -> Vec<MetadataIndexKey> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
