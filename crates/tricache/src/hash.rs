//! Chained hash index
//!
//! Fixed number of buckets, each holding a doubly linked chain of nodes that
//! live in a [`SlotArena`]. New nodes are prepended to their chain. The bucket
//! count never changes after construction; long chains cost time, not
//! correctness.

use crate::arena::{SlotArena, SlotId};
use crate::entry::Key;
use crate::error::{Error, InvariantError, Result};

struct HashNode<T> {
    key: Key,
    value: T,
    bucket: usize,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Hash index mapping keys to values of type `T`
pub struct HashIndex<T> {
    buckets: Vec<Option<SlotId>>,
    nodes: SlotArena<HashNode<T>>,
}

impl<T> HashIndex<T> {
    /// Create an index with `bucket_count` chains.
    ///
    /// A prime bucket count spreads sequential keys better, but any
    /// positive count is accepted.
    pub fn new(bucket_count: usize) -> Result<Self> {
        if bucket_count == 0 {
            return Err(Error::InvalidBucketCount(bucket_count));
        }
        Ok(Self {
            buckets: vec![None; bucket_count],
            nodes: SlotArena::new(),
        })
    }

    /// Bucket a key hashes to: `key mod bucket_count`, never negative
    pub fn hash_code(&self, key: Key) -> usize {
        key.rem_euclid(self.buckets.len() as i64) as usize
    }

    /// Number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `key`. Returns false without touching the index if the key is
    /// already present.
    pub fn add(&mut self, key: Key, value: T) -> bool {
        if self.find(key).is_some() {
            return false;
        }

        let bucket = self.hash_code(key);
        let head = self.buckets[bucket];
        let id = self.nodes.insert(HashNode {
            key,
            value,
            bucket,
            prev: None,
            next: head,
        });
        if let Some(head) = head {
            self.nodes[head].prev = Some(id);
        }
        self.buckets[bucket] = Some(id);
        true
    }

    /// Unlink `key` from its chain and return its value
    pub fn remove(&mut self, key: Key) -> Option<T> {
        let id = self.find(key)?;
        let (bucket, prev, next) = {
            let node = &self.nodes[id];
            (node.bucket, node.prev, node.next)
        };

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.buckets[bucket] = next,
        }
        if let Some(next) = next {
            self.nodes[next].prev = prev;
        }

        self.nodes.remove(id).map(|node| node.value)
    }

    /// Check if `key` is present
    pub fn contains(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    /// Value stored for `key`
    pub fn get(&self, key: Key) -> Option<&T> {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    /// Mutable value stored for `key`
    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        let id = self.find(key)?;
        Some(&mut self.nodes[id].value)
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|head| *head = None);
        self.nodes.clear();
    }

    /// Walk one bucket's chain, head first
    pub fn chain(&self, bucket: usize) -> Chain<'_, T> {
        Chain {
            index: self,
            cursor: self.buckets.get(bucket).copied().flatten(),
        }
    }

    /// Every bucket in order, paired with its chain
    pub fn buckets(&self) -> impl Iterator<Item = (usize, Chain<'_, T>)> + '_ {
        (0..self.buckets.len()).map(move |bucket| (bucket, self.chain(bucket)))
    }

    /// Verify chain links, bucket placement and the live count
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantError> {
        let mut seen = 0usize;
        for (bucket, head) in self.buckets.iter().enumerate() {
            let mut prev = None;
            let mut cursor = *head;
            while let Some(id) = cursor {
                let node = self.nodes.get(id).ok_or_else(|| {
                    InvariantError::new(format!("bucket {} links a freed node", bucket))
                })?;
                if node.bucket != bucket || self.hash_code(node.key) != bucket {
                    return Err(InvariantError::new(format!(
                        "key {} found in bucket {} but hashes to {}",
                        node.key,
                        bucket,
                        self.hash_code(node.key)
                    )));
                }
                if node.prev != prev {
                    return Err(InvariantError::new(format!(
                        "key {} has a broken prev link",
                        node.key
                    )));
                }
                seen += 1;
                prev = cursor;
                cursor = node.next;
            }
        }
        if seen != self.nodes.len() {
            return Err(InvariantError::new(format!(
                "{} nodes reachable from buckets, {} live",
                seen,
                self.nodes.len()
            )));
        }
        Ok(())
    }

    fn find(&self, key: Key) -> Option<SlotId> {
        let mut cursor = self.buckets[self.hash_code(key)];
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if node.key == key {
                return Some(id);
            }
            cursor = node.next;
        }
        None
    }
}

/// Iterator over one bucket chain
pub struct Chain<'a, T> {
    index: &'a HashIndex<T>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Chain<'a, T> {
    type Item = (Key, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        let node = &index.nodes[self.cursor?];
        self.cursor = node.next;
        Some((node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_basic() {
        let mut index = HashIndex::new(7).unwrap();

        assert!(index.add(3, "c"));
        assert!(index.add(10, "j"));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(3), Some(&"c"));
        assert_eq!(index.get(10), Some(&"j"));
        assert!(!index.contains(17));
        index.check_invariants().unwrap();
    }

    #[test]
    fn test_hash_rejects_duplicate() {
        let mut index = HashIndex::new(7).unwrap();

        assert!(index.add(1, "a"));
        assert!(!index.add(1, "b"));

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1), Some(&"a"));
    }

    #[test]
    fn test_hash_zero_buckets() {
        assert!(matches!(
            HashIndex::<()>::new(0),
            Err(Error::InvalidBucketCount(0))
        ));
    }

    #[test]
    fn test_hash_negative_keys() {
        let index = HashIndex::<()>::new(5).unwrap();

        assert_eq!(index.hash_code(-1), 4);
        assert_eq!(index.hash_code(-5), 0);
        assert_eq!(index.hash_code(12), 2);
    }

    #[test]
    fn test_hash_chain_prepends() {
        let mut index = HashIndex::new(5).unwrap();

        // All three land in bucket 2
        index.add(2, ());
        index.add(7, ());
        index.add(12, ());

        let keys: Vec<_> = index.chain(2).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![12, 7, 2]);
        assert_eq!(index.chain(0).count(), 0);
    }

    #[test]
    fn test_hash_remove_from_chain() {
        let mut index = HashIndex::new(5).unwrap();
        for key in [2, 7, 12, 17] {
            index.add(key, key * 10);
        }

        // middle, head, tail
        assert_eq!(index.remove(7), Some(70));
        assert_eq!(index.remove(17), Some(170));
        assert_eq!(index.remove(2), Some(20));
        assert_eq!(index.remove(2), None);

        let keys: Vec<_> = index.chain(2).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![12]);
        assert_eq!(index.len(), 1);
        index.check_invariants().unwrap();
    }

    #[test]
    fn test_hash_get_mut() {
        let mut index = HashIndex::new(3).unwrap();
        index.add(4, 1);

        if let Some(v) = index.get_mut(4) {
            *v = 2;
        }
        assert_eq!(index.get(4), Some(&2));
        assert_eq!(index.get_mut(5), None);
    }

    #[test]
    fn test_hash_clear() {
        let mut index = HashIndex::new(3).unwrap();
        for key in 0..10 {
            index.add(key, ());
        }
        index.clear();

        assert!(index.is_empty());
        assert!(index.buckets().all(|(_, mut chain)| chain.next().is_none()));
        assert!(index.add(4, ()));
        index.check_invariants().unwrap();
    }
}
