//! Cached entry definition

use crate::arena::SlotId;

/// Key type shared by every index
pub type Key = i64;

/// Handle to an [`Entry`] owned by the cache manager
pub type EntryId = SlotId;

/// One cached key with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    /// Unique key
    pub key: Key,
    /// Opaque payload
    pub payload: V,
}

impl<V> Entry<V> {
    /// Create a new entry
    pub fn new(key: Key, payload: V) -> Self {
        Self { key, payload }
    }
}
