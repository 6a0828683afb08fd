//! Recency list
//!
//! Doubly linked list over a [`SlotArena`], head = most recently touched,
//! tail = least recently touched. The list keeps plain head/tail handles (no
//! sentinel nodes). Handle-based operations are O(1); the key-based variants
//! scan from the head.

use crate::arena::{SlotArena, SlotId};
use crate::entry::Key;
use crate::error::InvariantError;

struct ListNode<T> {
    key: Key,
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Recency-ordered list of keys
pub struct RecencyList<T> {
    nodes: SlotArena<ListNode<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> RecencyList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            nodes: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Handle of the most recent node
    pub fn head(&self) -> Option<SlotId> {
        self.head
    }

    /// Handle of the least recent node
    pub fn tail(&self) -> Option<SlotId> {
        self.tail
    }

    /// Key of the most recent node
    pub fn head_key(&self) -> Option<Key> {
        self.head.map(|id| self.nodes[id].key)
    }

    /// Key of the least recent node, the next eviction victim
    pub fn tail_key(&self) -> Option<Key> {
        self.tail.map(|id| self.nodes[id].key)
    }

    /// Key behind a node handle
    pub fn key_of(&self, id: SlotId) -> Option<Key> {
        self.nodes.get(id).map(|node| node.key)
    }

    /// Prepend a node; it becomes the most recent
    pub fn insert_at_head(&mut self, key: Key, value: T) -> SlotId {
        let id = self.nodes.insert(ListNode {
            key,
            value,
            prev: None,
            next: None,
        });
        self.attach_front(id);
        id
    }

    /// Move the node behind `id` to the head. Returns false for a stale handle.
    pub fn move_node_to_head(&mut self, id: SlotId) -> bool {
        if !self.nodes.contains(id) {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Find `key` by scanning and move it to the head
    pub fn move_to_head(&mut self, key: Key) -> bool {
        match self.find(key) {
            Some(id) => self.move_node_to_head(id),
            None => false,
        }
    }

    /// Unlink the node behind `id`
    pub fn remove_node(&mut self, id: SlotId) -> Option<(Key, T)> {
        if !self.nodes.contains(id) {
            return None;
        }
        self.detach(id);
        self.nodes.remove(id).map(|node| (node.key, node.value))
    }

    /// Find `key` by scanning and unlink it
    pub fn remove(&mut self, key: Key) -> Option<T> {
        let id = self.find(key)?;
        self.remove_node(id).map(|(_, value)| value)
    }

    /// Unlink the least recent node
    pub fn pop_tail(&mut self) -> Option<(Key, T)> {
        let tail = self.tail?;
        self.remove_node(tail)
    }

    /// Handle of the node holding `key`, scanning from the head
    pub fn find(&self, key: Key) -> Option<SlotId> {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if node.key == key {
                return Some(id);
            }
            cursor = node.next;
        }
        None
    }

    /// Walk from most to least recent
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Verify link symmetry, head/tail ends and the node count
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut count = 0usize;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| InvariantError::new("recency list links a freed node"))?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "recency node {} has a broken prev link",
                    node.key
                )));
            }
            count += 1;
            if count > self.nodes.len() {
                return Err(InvariantError::new("recency list contains a cycle"));
            }
            prev = cursor;
            cursor = node.next;
        }
        if prev != self.tail {
            return Err(InvariantError::new("recency tail is not the last node"));
        }
        if count != self.nodes.len() {
            return Err(InvariantError::new(format!(
                "{} recency nodes reachable, {} live",
                count,
                self.nodes.len()
            )));
        }
        Ok(())
    }

    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[id];
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.nodes[head].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn detach(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = &self.nodes[id];
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }

        let node = &mut self.nodes[id];
        node.prev = None;
        node.next = None;
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Head-to-tail iterator over a [`RecencyList`]
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Key, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = &list.nodes[self.cursor?];
        self.cursor = node.next;
        Some((node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<T>(list: &RecencyList<T>) -> Vec<Key> {
        list.iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn test_insert_at_head() {
        let mut list = RecencyList::new();
        list.insert_at_head(1, "a");
        list.insert_at_head(2, "b");
        list.insert_at_head(3, "c");

        assert_eq!(keys(&list), vec![3, 2, 1]);
        assert_eq!(list.head_key(), Some(3));
        assert_eq!(list.tail_key(), Some(1));
        assert_eq!(list.len(), 3);
        list.check_invariants().unwrap();
    }

    #[test]
    fn test_move_node_to_head() {
        let mut list = RecencyList::new();
        let one = list.insert_at_head(1, ());
        list.insert_at_head(2, ());
        let three = list.insert_at_head(3, ());

        assert!(list.move_node_to_head(one));
        assert_eq!(keys(&list), vec![1, 3, 2]);

        // Already at head
        assert!(list.move_node_to_head(one));
        assert_eq!(keys(&list), vec![1, 3, 2]);

        assert!(list.move_to_head(2));
        assert_eq!(keys(&list), vec![2, 1, 3]);
        assert_eq!(list.tail(), Some(three));
        assert!(!list.move_to_head(42));
        list.check_invariants().unwrap();
    }

    #[test]
    fn test_remove() {
        let mut list = RecencyList::new();
        for key in 1..=4 {
            list.insert_at_head(key, key * 10);
        }

        assert_eq!(list.remove(3), Some(30)); // middle
        assert_eq!(list.remove(4), Some(40)); // head
        assert_eq!(list.remove(1), Some(10)); // tail
        assert_eq!(list.remove(1), None);

        assert_eq!(keys(&list), vec![2]);
        assert_eq!(list.head(), list.tail());
        list.check_invariants().unwrap();
    }

    #[test]
    fn test_pop_tail_order() {
        let mut list = RecencyList::new();
        list.insert_at_head(1, ());
        list.insert_at_head(2, ());
        list.move_to_head(1);

        assert_eq!(list.pop_tail().map(|(k, _)| k), Some(2));
        assert_eq!(list.pop_tail().map(|(k, _)| k), Some(1));
        assert!(list.pop_tail().is_none());
        assert!(list.is_empty());
        assert_eq!(list.tail_key(), None);
    }

    #[test]
    fn test_stale_handle() {
        let mut list = RecencyList::new();
        let id = list.insert_at_head(1, ());
        list.remove_node(id);

        assert!(!list.move_node_to_head(id));
        assert!(list.remove_node(id).is_none());
        assert_eq!(list.key_of(id), None);
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::new();
        list.insert_at_head(1, ());
        list.insert_at_head(2, ());
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
        list.insert_at_head(5, ());
        assert_eq!(keys(&list), vec![5]);
        list.check_invariants().unwrap();
    }
}
