//! TriCache: one entry set behind three indices
//!
//! The manager owns every [`Entry`] in a slot arena. The hash index, the
//! recency list and the ordered index only hold the key plus an [`EntryId`]
//! handle, so removing an entry can never leave one of them pointing at freed
//! memory; at worst a handle goes stale and resolves to `None`.
//!
//! Every public mutation updates the indices in a fixed order, and all three
//! agree on the live key set whenever control returns to the caller.

use tracing::{debug, warn};

use crate::arena::{SlotArena, SlotId};
use crate::config::CacheConfig;
use crate::entry::{Entry, EntryId, Key};
use crate::error::{Error, InvariantError, Result};
use crate::hash::HashIndex;
use crate::recency::RecencyList;
use crate::stats::CacheStats;
use crate::tree::{NodeView, OrderedIndex};

struct Slot<V> {
    entry: Entry<V>,
    recency: Option<SlotId>,
}

/// Bounded cache with exact-key, recency and ordered access
pub struct TriCache<V> {
    /// Sole owner of the entries
    entries: SlotArena<Slot<V>>,

    /// Authoritative key set and live count
    hash: HashIndex<EntryId>,

    /// Eviction order, most recent first
    recency: RecencyList<EntryId>,

    /// Sorted view for ordered and range reads
    tree: OrderedIndex<EntryId>,

    /// Maximum number of live entries
    capacity: usize,

    stats: CacheStats,
}

impl<V> TriCache<V> {
    /// Create a cache holding at most `capacity` entries in `bucket_count`
    /// hash buckets.
    ///
    /// A capacity below the bucket count is raised to the bucket count.
    ///
    /// # Errors
    /// * [`Error::InvalidCapacity`] if `capacity` is zero
    /// * [`Error::InvalidBucketCount`] if `bucket_count` is zero
    pub fn new(capacity: usize, bucket_count: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        let hash = HashIndex::new(bucket_count)?;

        let capacity = if bucket_count > capacity {
            warn!(
                capacity,
                bucket_count, "capacity is below the bucket count, raising it to match"
            );
            bucket_count
        } else {
            capacity
        };

        Ok(Self {
            // capacity is only a bound and may be huge
            entries: SlotArena::with_capacity(bucket_count),
            hash,
            recency: RecencyList::new(),
            tree: OrderedIndex::new(),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Create a cache from a [`CacheConfig`]
    pub fn with_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.capacity, config.bucket_count)
    }

    /// Insert `payload` under `key` as the most recent entry.
    ///
    /// An existing entry for `key` is removed first, so the key loses its old
    /// recency position. If the cache is full the least recent entry is
    /// evicted. Returns false only if the hash index rejects the key as a
    /// duplicate, in which case nothing was inserted.
    pub fn add(&mut self, key: Key, payload: V) -> bool {
        if self.hash.contains(key) {
            debug!(key, "replacing existing entry");
            self.detach(key);
        }

        if self.recency.len() >= self.capacity {
            self.evict();
        }

        let entry = self.entries.insert(Slot {
            entry: Entry::new(key, payload),
            recency: None,
        });
        if !self.hash.add(key, entry) {
            warn!(key, "hash index rejected a duplicate key");
            self.entries.remove(entry);
            return false;
        }

        let node = self.recency.insert_at_head(key, entry);
        if let Some(slot) = self.entries.get_mut(entry) {
            slot.recency = Some(node);
        }

        self.tree.insert(key, entry);
        self.stats.record_insert();
        true
    }

    /// Remove `key`. Returns false if it was not cached.
    pub fn remove(&mut self, key: Key) -> bool {
        self.take(key).is_some()
    }

    /// Remove `key` and hand back its payload
    pub fn take(&mut self, key: Key) -> Option<V> {
        let payload = self.detach(key)?;
        self.stats.record_removal();
        Some(payload)
    }

    /// Payload for `key`, promoting it to most recent
    pub fn get(&mut self, key: Key) -> Option<&V> {
        let Some(&entry) = self.hash.get(key) else {
            self.stats.record_miss();
            return None;
        };
        self.touch(entry);
        self.stats.record_hit();
        self.payload(entry)
    }

    /// Payload for `key` without changing its recency
    pub fn peek(&self, key: Key) -> Option<&V> {
        self.hash.get(key).and_then(|&entry| self.payload(entry))
    }

    /// Check if `key` is cached, promoting it to most recent if so
    pub fn contains(&mut self, key: Key) -> bool {
        match self.hash.get(key) {
            Some(&entry) => {
                self.touch(entry);
                true
            }
            None => false,
        }
    }

    /// Drop every entry and reset the statistics
    pub fn clear(&mut self) {
        self.recency.clear();
        self.hash.clear();
        self.tree.clear();
        self.entries.clear();
        self.stats.reset();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.hash.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.hash.is_empty()
    }

    /// Maximum number of entries, after the bucket-count floor
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of hash buckets
    pub fn bucket_count(&self) -> usize {
        self.hash.bucket_count()
    }

    /// Entries in ascending key order
    pub fn sort_ascending(&self) -> impl Iterator<Item = (Key, &V)> + '_ {
        self.resolve(self.tree.in_order())
    }

    /// Entries in descending key order
    pub fn sort_descending(&self) -> impl Iterator<Item = (Key, &V)> + '_ {
        self.resolve(self.tree.reverse_order())
    }

    /// Entries with `low <= key <= high`, ascending
    pub fn range(&self, low: Key, high: Key) -> impl Iterator<Item = (Key, &V)> + '_ {
        self.resolve(self.tree.range(low, high))
    }

    /// Keys from most to least recently touched
    pub fn recency_order(&self) -> impl Iterator<Item = Key> + '_ {
        self.recency.iter().map(|(key, _)| key)
    }

    /// Resolve a handle stored in one of the indices
    pub fn entry(&self, id: EntryId) -> Option<&Entry<V>> {
        self.entries.get(id).map(|slot| &slot.entry)
    }

    /// Read-only view of the ordered index
    pub fn tree(&self) -> &OrderedIndex<EntryId> {
        &self.tree
    }

    /// Read-only view of the hash index
    pub fn hash_index(&self) -> &HashIndex<EntryId> {
        &self.hash
    }

    /// Read-only view of the recency list
    pub fn recency(&self) -> &RecencyList<EntryId> {
        &self.recency
    }

    /// Activity counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Check every index's own invariants and that all three describe the
    /// same entry set.
    pub fn check_consistency(&self) -> std::result::Result<(), InvariantError> {
        self.tree.check_invariants()?;
        self.hash.check_invariants()?;
        self.recency.check_invariants()?;

        let live = self.entries.len();
        let counts = [self.hash.len(), self.recency.len(), self.tree.len()];
        if counts.iter().any(|&count| count != live) {
            return Err(InvariantError::new(format!(
                "index sizes disagree: {} entries, hash {}, recency {}, tree {}",
                live, counts[0], counts[1], counts[2]
            )));
        }
        if live > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                live, self.capacity
            )));
        }

        for (key, &entry) in self.recency.iter() {
            if self.hash.get(key) != Some(&entry) || self.tree.get(key) != Some(&entry) {
                return Err(InvariantError::new(format!(
                    "key {} resolves to different entries across indices",
                    key
                )));
            }
            let slot = self
                .entries
                .get(entry)
                .ok_or_else(|| InvariantError::new(format!("key {} has a stale handle", key)))?;
            let linked = slot.recency.and_then(|node| self.recency.key_of(node));
            if slot.entry.key != key || linked != Some(key) {
                return Err(InvariantError::new(format!(
                    "entry for key {} is linked to the wrong nodes",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Unlink `key` from the recency list, then the tree, then the hash index,
    /// and free its entry.
    fn detach(&mut self, key: Key) -> Option<V> {
        let entry = *self.hash.get(key)?;

        if let Some(node) = self.entries.get(entry).and_then(|slot| slot.recency) {
            self.recency.remove_node(node);
        } else {
            self.recency.remove(key);
        }
        self.tree.remove(key);
        let removed = self.hash.remove(key);

        let slot = self.entries.remove(entry);
        removed.and(slot).map(|slot| slot.entry.payload)
    }

    fn evict(&mut self) -> Option<Key> {
        let key = self.recency.tail_key()?;
        debug!(key, capacity = self.capacity, "evicting least recently used entry");
        self.detach(key)?;
        self.stats.record_eviction();
        Some(key)
    }

    fn touch(&mut self, entry: EntryId) {
        if let Some(node) = self.entries.get(entry).and_then(|slot| slot.recency) {
            self.recency.move_node_to_head(node);
        }
    }

    fn payload(&self, entry: EntryId) -> Option<&V> {
        self.entries.get(entry).map(|slot| &slot.entry.payload)
    }

    fn resolve<'a>(
        &'a self,
        nodes: impl Iterator<Item = NodeView<'a, EntryId>> + 'a,
    ) -> impl Iterator<Item = (Key, &'a V)> + 'a {
        nodes.filter_map(move |node| self.payload(*node.value).map(|payload| (node.key, payload)))
    }
}
