//! Red-black tree node types

use std::fmt;

use crate::arena::SlotId;
use crate::entry::Key;

/// Node color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node; never the child of another red node
    Red,
    /// Black node; counted by the black-height
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("RED"),
            Color::Black => f.write_str("BLACK"),
        }
    }
}

/// Child side, used to write each rotation and fixup case once for both
/// mirror images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    pub(crate) fn opposite(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

pub(crate) struct TreeNode<T> {
    pub(crate) key: Key,
    pub(crate) value: T,
    pub(crate) color: Color,
    pub(crate) size: usize,
    pub(crate) left: Option<SlotId>,
    pub(crate) right: Option<SlotId>,
    pub(crate) parent: Option<SlotId>,
}

impl<T> TreeNode<T> {
    /// Fresh red leaf
    pub(crate) fn leaf(key: Key, value: T, parent: Option<SlotId>) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            size: 1,
            left: None,
            right: None,
            parent,
        }
    }

    pub(crate) fn child(&self, dir: Dir) -> Option<SlotId> {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, dir: Dir, child: Option<SlotId>) {
        match dir {
            Dir::Left => self.left = child,
            Dir::Right => self.right = child,
        }
    }
}

/// Read-only view of one node, yielded by the traversal iterators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView<'a, T> {
    /// Node key
    pub key: Key,
    /// Value attached to the key
    pub value: &'a T,
    /// Node color
    pub color: Color,
    /// Number of nodes in the subtree rooted here, this one included
    pub subtree_size: usize,
}

impl<'a, T> NodeView<'a, T> {
    pub(crate) fn of(node: &'a TreeNode<T>) -> Self {
        Self {
            key: node.key,
            value: &node.value,
            color: node.color,
            subtree_size: node.size,
        }
    }
}
