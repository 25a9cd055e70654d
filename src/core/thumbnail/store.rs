//! Thumbnail store trait and the in-memory backend.
//!
//! ## Eviction contract
//! A store is best-effort. It may drop any entry at any moment (memory
//! pressure, capacity, an external purge) and callers must treat a miss
//! as "regenerate", never as an error. The cache never removes entries on
//! its own; rows deleted from the list simply leave theirs behind.

use super::{Thumbnail, ThumbnailKey};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

/// Trait for thumbnail stores
pub trait ThumbnailStore: Send + Sync {
    /// Get a stored thumbnail
    fn get(&self, key: &ThumbnailKey) -> Option<Arc<Thumbnail>>;

    /// Store a thumbnail under its own key, replacing any previous one
    fn insert(&self, thumbnail: Arc<Thumbnail>);

    /// Forget one entry; returns whether it was present
    fn remove(&self, key: &ThumbnailKey) -> bool;

    /// Forget everything
    fn clear(&self);

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<ThumbnailKey, Arc<Thumbnail>>,
    order: VecDeque<ThumbnailKey>,
}

/// In-memory thumbnail store
///
/// Unbounded by default. With a capacity, the oldest insertion is
/// dropped first.
#[derive(Default)]
pub struct InMemoryThumbnailStore {
    entries: RwLock<Entries>,
    capacity: Option<usize>,
}

impl InMemoryThumbnailStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that keeps at most `capacity` thumbnails
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            capacity: Some(capacity.max(1)),
        }
    }
}

impl ThumbnailStore for InMemoryThumbnailStore {
    fn get(&self, key: &ThumbnailKey) -> Option<Arc<Thumbnail>> {
        // A poisoned lock only means a writer panicked; the map is still
        // usable and losing entries is allowed anyway.
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.map.get(key).cloned()
    }

    fn insert(&self, thumbnail: Arc<Thumbnail>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let key = thumbnail.key().clone();

        if entries.map.insert(key.clone(), thumbnail).is_none() {
            entries.order.push_back(key);
        }

        if let Some(capacity) = self.capacity {
            while entries.map.len() > capacity {
                match entries.order.pop_front() {
                    Some(oldest) => {
                        entries.map.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
    }

    fn remove(&self, key: &ThumbnailKey) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let removed = entries.map.remove(key).is_some();
        if removed {
            entries.order.retain(|k| k != key);
        }
        removed
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.map.clear();
        entries.order.clear();
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .map
            .len()
    }
}
