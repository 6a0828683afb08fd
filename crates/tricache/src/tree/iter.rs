//! Lazy traversals over [`OrderedIndex`]
//!
//! None of these touch colors or links; they hold a shared borrow of the tree
//! and a small explicit stack or queue.

use std::collections::VecDeque;

use super::node::{Dir, NodeView};
use super::OrderedIndex;
use crate::arena::SlotId;
use crate::entry::Key;

impl<T> OrderedIndex<T> {
    /// Keys in ascending order
    pub fn in_order(&self) -> Sorted<'_, T> {
        Sorted::new(self, Dir::Left)
    }

    /// Keys in descending order
    pub fn reverse_order(&self) -> Sorted<'_, T> {
        Sorted::new(self, Dir::Right)
    }

    /// Node, then left subtree, then right subtree
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Depth-first walk; same order as [`pre_order`](Self::pre_order)
    pub fn depth_first(&self) -> PreOrder<'_, T> {
        self.pre_order()
    }

    /// Left subtree, then right subtree, then node
    pub fn post_order(&self) -> PostOrder<'_, T> {
        PostOrder {
            tree: self,
            stack: Vec::new(),
            cursor: self.root,
            last: None,
        }
    }

    /// Breadth-first, one level at a time from the root
    pub fn level_order(&self) -> LevelOrder<'_, T> {
        LevelOrder {
            tree: self,
            queue: self.root.into_iter().collect(),
        }
    }

    /// Ascending keys within `low..=high`. Subtrees entirely outside the
    /// bounds are never visited.
    pub fn range(&self, low: Key, high: Key) -> Range<'_, T> {
        let mut range = Range {
            tree: self,
            stack: Vec::new(),
            low,
            high,
        };
        if low <= high {
            range.descend(self.root);
        }
        range
    }
}

/// In-order walk, ascending or descending
pub struct Sorted<'a, T> {
    tree: &'a OrderedIndex<T>,
    stack: Vec<SlotId>,
    first: Dir,
}

impl<'a, T> Sorted<'a, T> {
    fn new(tree: &'a OrderedIndex<T>, first: Dir) -> Self {
        let mut sorted = Self {
            tree,
            stack: Vec::new(),
            first,
        };
        sorted.descend(tree.root);
        sorted
    }

    fn descend(&mut self, from: Option<SlotId>) {
        let mut cursor = from;
        while let Some(id) = cursor {
            self.stack.push(id);
            cursor = self.tree.nodes[id].child(self.first);
        }
    }
}

impl<'a, T> Iterator for Sorted<'a, T> {
    type Item = NodeView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id];
        self.descend(node.child(self.first.opposite()));
        Some(NodeView::of(node))
    }
}

/// Pre-order walk
pub struct PreOrder<'a, T> {
    tree: &'a OrderedIndex<T>,
    stack: Vec<SlotId>,
}

impl<'a, T> Iterator for PreOrder<'a, T> {
    type Item = NodeView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id];
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some(NodeView::of(node))
    }
}

/// Post-order walk
pub struct PostOrder<'a, T> {
    tree: &'a OrderedIndex<T>,
    stack: Vec<SlotId>,
    cursor: Option<SlotId>,
    last: Option<SlotId>,
}

impl<'a, T> Iterator for PostOrder<'a, T> {
    type Item = NodeView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            if let Some(id) = self.cursor {
                self.stack.push(id);
                self.cursor = tree.nodes[id].left;
                continue;
            }

            let top = *self.stack.last()?;
            let right = tree.nodes[top].right;
            if right.is_some() && right != self.last {
                self.cursor = right;
                continue;
            }

            self.stack.pop();
            self.last = Some(top);
            return Some(NodeView::of(&tree.nodes[top]));
        }
    }
}

/// Breadth-first walk
pub struct LevelOrder<'a, T> {
    tree: &'a OrderedIndex<T>,
    queue: VecDeque<SlotId>,
}

impl<'a, T> Iterator for LevelOrder<'a, T> {
    type Item = NodeView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        let tree = self.tree;
        let node = &tree.nodes[id];
        self.queue.extend(node.left);
        self.queue.extend(node.right);
        Some(NodeView::of(node))
    }
}

/// Bounded ascending walk over `low..=high`
pub struct Range<'a, T> {
    tree: &'a OrderedIndex<T>,
    stack: Vec<SlotId>,
    low: Key,
    high: Key,
}

impl<'a, T> Range<'a, T> {
    fn descend(&mut self, from: Option<SlotId>) {
        let tree = self.tree;
        let mut cursor = from;
        while let Some(id) = cursor {
            let node = &tree.nodes[id];
            if node.key < self.low {
                cursor = node.right;
            } else {
                self.stack.push(id);
                cursor = node.left;
            }
        }
    }
}

impl<'a, T> Iterator for Range<'a, T> {
    type Item = NodeView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id];
        if node.key > self.high {
            self.stack.clear();
            return None;
        }
        self.descend(node.right);
        Some(NodeView::of(node))
    }
}
