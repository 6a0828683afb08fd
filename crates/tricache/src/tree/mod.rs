//! Ordered index: a red-black tree over cache keys
//!
//! Nodes live in a [`SlotArena`] and point at each other through `SlotId`
//! handles, so rotations only rewrite handle fields. Every node also keeps the
//! size of its subtree, which makes [`rank`](OrderedIndex::rank) and
//! [`select`](OrderedIndex::select) O(log n).
//!
//! ## Invariants (checked by [`check_invariants`](OrderedIndex::check_invariants))
//! - The root is black.
//! - A red node never has a red parent.
//! - Every path from a node down to a missing child crosses the same number
//!   of black nodes.
//! - `subtree_size` = 1 + sizes of both children.
//!
//! Together these keep the height under `2 * log2(n + 1)`.

mod iter;
mod node;

use std::cmp::Ordering;

use crate::arena::{SlotArena, SlotId};
use crate::entry::Key;
use crate::error::InvariantError;

pub use iter::{LevelOrder, PostOrder, PreOrder, Range, Sorted};
pub use node::{Color, NodeView};

use node::{Dir, TreeNode};

/// Red-black tree mapping keys to values of type `T`
pub struct OrderedIndex<T> {
    nodes: SlotArena<TreeNode<T>>,
    root: Option<SlotId>,
}

impl<T> OrderedIndex<T> {
    /// Create an empty tree
    pub fn new() -> Self {
        Self {
            nodes: SlotArena::new(),
            root: None,
        }
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node, if any
    pub fn root(&self) -> Option<NodeView<'_, T>> {
        self.root.map(|id| NodeView::of(&self.nodes[id]))
    }

    /// Check if `key` is present
    pub fn contains(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    /// Value stored for `key`
    pub fn get(&self, key: Key) -> Option<&T> {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    /// Smallest key
    pub fn minimum(&self) -> Option<NodeView<'_, T>> {
        self.root
            .map(|root| NodeView::of(&self.nodes[self.extreme(root, Dir::Left)]))
    }

    /// Largest key
    pub fn maximum(&self) -> Option<NodeView<'_, T>> {
        self.root
            .map(|root| NodeView::of(&self.nodes[self.extreme(root, Dir::Right)]))
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty)
    pub fn height(&self) -> usize {
        self.height_of(self.root)
    }

    /// Number of keys strictly smaller than `key`
    pub fn rank(&self, key: Key) -> usize {
        let mut rank = 0;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if key <= node.key {
                cursor = node.left;
            } else {
                rank += 1 + self.size(node.left);
                cursor = node.right;
            }
        }
        rank
    }

    /// The `k`-th smallest node, counting from zero
    pub fn select(&self, k: usize) -> Option<NodeView<'_, T>> {
        let mut k = k;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            let left_size = self.size(node.left);
            match k.cmp(&left_size) {
                Ordering::Less => cursor = node.left,
                Ordering::Equal => return Some(NodeView::of(node)),
                Ordering::Greater => {
                    k -= left_size + 1;
                    cursor = node.right;
                }
            }
        }
        None
    }

    /// Insert `key`, or replace its value if it is already present.
    ///
    /// Replacing a value is not a structural change: colors, links and
    /// subtree sizes stay as they are. Returns the replaced value.
    pub fn insert(&mut self, key: Key, value: T) -> Option<T> {
        let mut parent = None;
        let mut side = Dir::Left;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            side = match key.cmp(&self.nodes[id].key) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => {
                    return Some(std::mem::replace(&mut self.nodes[id].value, value));
                }
            };
            parent = Some(id);
            cursor = self.nodes[id].child(side);
        }

        let id = self.nodes.insert(TreeNode::leaf(key, value, parent));
        match parent {
            Some(parent) => self.nodes[parent].set_child(side, Some(id)),
            None => self.root = Some(id),
        }
        self.resize_path(parent, |size| size + 1);

        self.fix_insert(id);
        self.blacken_root();
        None
    }

    /// Remove `key` and return its value
    pub fn remove(&mut self, key: Key) -> Option<T> {
        let id = self.find(key)?;
        let target = match (self.nodes[id].left, self.nodes[id].right) {
            (Some(_), Some(right)) => {
                // Two children: the in-order successor takes this node's
                // place and its own (at most one-child) node is deleted.
                let successor = self.extreme(right, Dir::Left);
                if let Some((node, succ)) = self.nodes.get_pair_mut(id, successor) {
                    std::mem::swap(&mut node.key, &mut succ.key);
                    std::mem::swap(&mut node.value, &mut succ.value);
                }
                successor
            }
            _ => id,
        };

        let value = self.unlink(target);
        self.blacken_root();
        value
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Verify every red-black and size invariant, returning the black-height
    pub fn check_invariants(&self) -> Result<usize, InvariantError> {
        let Some(root) = self.root else {
            return if self.nodes.is_empty() {
                Ok(0)
            } else {
                Err(InvariantError::new("tree has nodes but no root"))
            };
        };

        let node = &self.nodes[root];
        if node.color != Color::Black {
            return Err(InvariantError::new(format!("root {} is red", node.key)));
        }
        if node.parent.is_some() {
            return Err(InvariantError::new("root has a parent"));
        }

        let (black_height, size) = self.check_subtree(root, None, None, None)?;
        if size != self.nodes.len() {
            return Err(InvariantError::new(format!(
                "{} nodes reachable from the root, {} live",
                size,
                self.nodes.len()
            )));
        }
        Ok(black_height)
    }

    fn check_subtree(
        &self,
        id: SlotId,
        parent: Option<SlotId>,
        low: Option<Key>,
        high: Option<Key>,
    ) -> Result<(usize, usize), InvariantError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| InvariantError::new("tree links a freed node"))?;

        if node.parent != parent {
            return Err(InvariantError::new(format!(
                "node {} has a wrong parent link",
                node.key
            )));
        }
        if low.is_some_and(|low| node.key <= low) || high.is_some_and(|high| node.key >= high) {
            return Err(InvariantError::new(format!(
                "node {} is out of search order",
                node.key
            )));
        }
        if node.color == Color::Red && parent.is_some_and(|p| self.nodes[p].color == Color::Red) {
            return Err(InvariantError::new(format!(
                "red node {} has a red parent",
                node.key
            )));
        }

        let (left_black, left_size) = match node.left {
            Some(left) => self.check_subtree(left, Some(id), low, Some(node.key))?,
            None => (0, 0),
        };
        let (right_black, right_size) = match node.right {
            Some(right) => self.check_subtree(right, Some(id), Some(node.key), high)?,
            None => (0, 0),
        };

        if left_black != right_black {
            return Err(InvariantError::new(format!(
                "black-height mismatch under {}: {} vs {}",
                node.key, left_black, right_black
            )));
        }
        let size = 1 + left_size + right_size;
        if node.size != size {
            return Err(InvariantError::new(format!(
                "node {} records size {} but has {}",
                node.key, node.size, size
            )));
        }

        let black = usize::from(node.color == Color::Black);
        Ok((left_black + black, size))
    }

    fn find(&self, key: Key) -> Option<SlotId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Walk from `id` as far as possible toward `dir`
    fn extreme(&self, id: SlotId, dir: Dir) -> SlotId {
        let mut id = id;
        while let Some(next) = self.nodes[id].child(dir) {
            id = next;
        }
        id
    }

    fn height_of(&self, id: Option<SlotId>) -> usize {
        match id {
            Some(id) => {
                let node = &self.nodes[id];
                1 + self.height_of(node.left).max(self.height_of(node.right))
            }
            None => 0,
        }
    }

    fn size(&self, id: Option<SlotId>) -> usize {
        id.map_or(0, |id| self.nodes[id].size)
    }

    /// Missing children count as black
    fn is_red(&self, id: Option<SlotId>) -> bool {
        id.is_some_and(|id| self.nodes[id].color == Color::Red)
    }

    fn set_color(&mut self, id: Option<SlotId>, color: Color) {
        if let Some(id) = id {
            self.nodes[id].color = color;
        }
    }

    fn blacken_root(&mut self) {
        self.set_color(self.root, Color::Black);
    }

    /// Apply `f` to the size of `from` and every ancestor above it
    fn resize_path(&mut self, from: Option<SlotId>, f: impl Fn(usize) -> usize) {
        let mut cursor = from;
        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            node.size = f(node.size);
            cursor = node.parent;
        }
    }

    /// Point whatever referenced `old` (its parent, or the root) at `new`
    fn replace_child(&mut self, parent: Option<SlotId>, old: SlotId, new: Option<SlotId>) {
        match parent {
            Some(parent) => {
                let node = &mut self.nodes[parent];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    node.right = new;
                }
            }
            None => self.root = new,
        }
    }

    /// Rotate `id` down toward `dir` and return the node that took its place.
    ///
    /// `Dir::Left` is the textbook left rotation. Subtree totals are
    /// unchanged, so only the two rotated nodes need new sizes.
    fn rotate(&mut self, id: SlotId, dir: Dir) -> SlotId {
        let Some(pivot) = self.nodes[id].child(dir.opposite()) else {
            return id;
        };

        let inner = self.nodes[pivot].child(dir);
        self.nodes[id].set_child(dir.opposite(), inner);
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(id);
        }

        let parent = self.nodes[id].parent;
        self.nodes[pivot].parent = parent;
        self.replace_child(parent, id, Some(pivot));

        self.nodes[pivot].set_child(dir, Some(id));
        self.nodes[id].parent = Some(pivot);

        self.nodes[pivot].size = self.nodes[id].size;
        self.nodes[id].size = 1 + self.size(self.nodes[id].left) + self.size(self.nodes[id].right);
        pivot
    }

    /// Restore the red-black rules after `id` was inserted red
    fn fix_insert(&mut self, id: SlotId) {
        let Some(parent) = self.nodes[id].parent else {
            self.nodes[id].color = Color::Black;
            return;
        };
        if self.nodes[parent].color == Color::Black {
            return;
        }
        let Some(grand) = self.nodes[parent].parent else {
            self.nodes[parent].color = Color::Black;
            return;
        };

        let side = if self.nodes[grand].left == Some(parent) {
            Dir::Left
        } else {
            Dir::Right
        };
        let uncle = self.nodes[grand].child(side.opposite());

        if self.is_red(uncle) {
            self.nodes[parent].color = Color::Black;
            self.set_color(uncle, Color::Black);
            self.nodes[grand].color = Color::Red;
            return self.fix_insert(grand);
        }

        // Inner grandchild: turn it into an outer one first
        let parent = if self.nodes[parent].child(side) != Some(id) {
            self.rotate(parent, side)
        } else {
            parent
        };

        self.nodes[parent].color = Color::Black;
        self.nodes[grand].color = Color::Red;
        self.rotate(grand, side.opposite());
    }

    /// Detach `id`, which has at most one child, and free it
    fn unlink(&mut self, id: SlotId) -> Option<T> {
        let (child, parent) = {
            let node = &self.nodes[id];
            (node.left.or(node.right), node.parent)
        };

        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
        self.replace_child(parent, id, child);
        self.resize_path(parent, |size| size - 1);

        let removed = self.nodes.remove(id)?;
        if removed.color == Color::Black {
            self.fix_remove(child, parent);
        }
        Some(removed.value)
    }

    /// Resolve a missing black on the path through `id`, whose parent is
    /// `parent`. `id` may be absent when the removed node had no children.
    fn fix_remove(&mut self, id: Option<SlotId>, parent: Option<SlotId>) {
        if self.is_red(id) {
            self.set_color(id, Color::Black);
            return;
        }
        let Some(parent) = parent else {
            return;
        };

        let side = if self.nodes[parent].left == id {
            Dir::Left
        } else {
            Dir::Right
        };
        let Some(mut sibling) = self.nodes[parent].child(side.opposite()) else {
            let grand = self.nodes[parent].parent;
            return self.fix_remove(Some(parent), grand);
        };

        if self.nodes[sibling].color == Color::Red {
            self.nodes[sibling].color = Color::Black;
            self.nodes[parent].color = Color::Red;
            self.rotate(parent, side);
            match self.nodes[parent].child(side.opposite()) {
                Some(next) => sibling = next,
                None => return,
            }
        }

        let near = self.nodes[sibling].child(side);
        let far = self.nodes[sibling].child(side.opposite());

        if !self.is_red(near) && !self.is_red(far) {
            self.nodes[sibling].color = Color::Red;
            if self.nodes[parent].color == Color::Red {
                self.nodes[parent].color = Color::Black;
                return;
            }
            let grand = self.nodes[parent].parent;
            return self.fix_remove(Some(parent), grand);
        }

        if !self.is_red(far) {
            self.set_color(near, Color::Black);
            self.nodes[sibling].color = Color::Red;
            sibling = self.rotate(sibling, side.opposite());
        }

        let far = self.nodes[sibling].child(side.opposite());
        self.nodes[sibling].color = self.nodes[parent].color;
        self.nodes[parent].color = Color::Black;
        self.set_color(far, Color::Black);
        self.rotate(parent, side);
    }
}

impl<T> Default for OrderedIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
