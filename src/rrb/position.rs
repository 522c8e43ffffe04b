//! Position descriptors: where a traversal currently stands in the tree.
//!
//! A [`Pos`] pairs a node with the state needed to recurse below it (shift,
//! subtree size, size table). Algorithms are written once against the closed
//! tag set and dispatched through [`Pos::visit`].

use super::node::{Node, NodePtr};
use crate::policy::Policy;

/// Tagged view of one node during a traversal.
pub enum Pos<'a, T: 'a, P: Policy, const B: u32> {
    /// Inner node with no children (the root of an empty tree).
    Empty,
    /// Leaf at shift 0.
    Leaf { node: &'a NodePtr<T, P> },
    /// Regular inner node whose children are all at full capacity.
    Full { node: &'a NodePtr<T, P>, shift: u32 },
    /// Regular inner node whose last child may be partial.
    Regular {
        node: &'a NodePtr<T, P>,
        shift: u32,
        size: usize,
    },
    /// Inner node with a cumulative size table.
    Relaxed {
        node: &'a NodePtr<T, P>,
        shift: u32,
        sizes: &'a [usize],
    },
}

/// Callbacks selected by [`Pos::visit`].
///
/// `Empty`, `Full` and `Regular` positions all go to `on_inner`.
pub trait Visitor<'a, T: 'a, P: Policy, const B: u32> {
    type Output;

    fn on_relaxed(&mut self, pos: Pos<'a, T, P, B>) -> Self::Output;
    fn on_inner(&mut self, pos: Pos<'a, T, P, B>) -> Self::Output;
    fn on_leaf(&mut self, pos: Pos<'a, T, P, B>) -> Self::Output;
}

impl<'a, T: 'a, P: Policy, const B: u32> Pos<'a, T, P, B> {
    /// Classifies `node`, which sits at `shift` and holds `size` elements.
    ///
    /// `size` is only consulted for regular inner nodes.
    pub fn new(node: &'a NodePtr<T, P>, shift: u32, size: usize) -> Self {
        match &**node {
            Node::Leaf { .. } => Self::Leaf { node },
            Node::Inner {
                sizes: Some(sizes), ..
            } => Self::Relaxed { node, shift, sizes },
            Node::Inner { children, .. } => {
                if children.is_empty() {
                    Self::Empty
                } else if size == children.len() << shift {
                    Self::Full { node, shift }
                } else {
                    Self::Regular { node, shift, size }
                }
            }
        }
    }

    /// Dispatches to the visitor callback matching this position's tag.
    pub fn visit<V: Visitor<'a, T, P, B>>(self, visitor: &mut V) -> V::Output {
        match self {
            Self::Relaxed { .. } => visitor.on_relaxed(self),
            Self::Leaf { .. } => visitor.on_leaf(self),
            Self::Empty | Self::Full { .. } | Self::Regular { .. } => visitor.on_inner(self),
        }
    }

    pub const fn node(self) -> Option<&'a NodePtr<T, P>> {
        match self {
            Self::Empty => None,
            Self::Leaf { node }
            | Self::Full { node, .. }
            | Self::Regular { node, .. }
            | Self::Relaxed { node, .. } => Some(node),
        }
    }

    pub const fn shift(self) -> u32 {
        match self {
            Self::Empty | Self::Leaf { .. } => 0,
            Self::Full { shift, .. } | Self::Regular { shift, .. } | Self::Relaxed { shift, .. } => {
                shift
            }
        }
    }

    /// Number of live slots.
    pub fn count(self) -> usize {
        self.node().map_or(0, |node| node.count())
    }

    /// Number of elements below this position.
    pub fn size(self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Leaf { node } => node.count(),
            Self::Full { node, shift } => node.count() << shift,
            Self::Regular { size, .. } => size,
            Self::Relaxed { sizes, .. } => sizes.last().copied().unwrap_or(0),
        }
    }

    /// Elements of a leaf position.
    pub fn items(self) -> &'a [T] {
        match self {
            Self::Leaf { node } => node.items(),
            _ => &[],
        }
    }

    /// Children of an inner position.
    pub fn children(self) -> &'a [NodePtr<T, P>] {
        match self {
            Self::Empty | Self::Leaf { .. } => &[],
            Self::Full { node, .. } | Self::Regular { node, .. } | Self::Relaxed { node, .. } => {
                node.children()
            }
        }
    }

    /// Offset of the slot holding element `idx` (relative to this subtree).
    ///
    /// Relaxed children hold at most `2^shift` elements, so the search starts
    /// at `idx >> shift` and only ever moves right.
    pub fn index(self, idx: usize) -> usize {
        match self {
            Self::Empty | Self::Leaf { .. } => idx,
            Self::Full { shift, .. } | Self::Regular { shift, .. } => idx >> shift,
            Self::Relaxed { shift, sizes, .. } => {
                let mut offset = idx >> shift;
                while sizes[offset] <= idx {
                    offset += 1;
                }
                offset
            }
        }
    }

    /// Number of elements in the slots before `offset`.
    pub fn size_before(self, offset: usize) -> usize {
        match self {
            Self::Empty | Self::Leaf { .. } => offset,
            Self::Full { shift, .. } | Self::Regular { shift, .. } => offset << shift,
            Self::Relaxed { sizes, .. } => {
                if offset == 0 {
                    0
                } else {
                    sizes[offset - 1]
                }
            }
        }
    }

    /// Number of elements in slot `offset`.
    pub fn child_size(self, offset: usize) -> usize {
        match self {
            Self::Empty => 0,
            Self::Leaf { .. } => 1,
            Self::Full { shift, .. } => 1 << shift,
            Self::Regular { node, shift, size } => {
                if offset + 1 < node.count() {
                    1 << shift
                } else {
                    size - (offset << shift)
                }
            }
            Self::Relaxed { sizes, .. } => sizes[offset] - self.size_before(offset),
        }
    }

    /// Position of child `offset`, one level down.
    pub fn child(self, offset: usize) -> Self {
        Self::new(&self.children()[offset], self.shift() - B, self.child_size(offset))
    }

    /// Cumulative size table, materialized for regular nodes.
    pub fn size_table(self) -> Vec<usize> {
        match self {
            Self::Relaxed { sizes, .. } => sizes.to_vec(),
            _ => (0..self.count())
                .map(|offset| self.size_before(offset) + self.child_size(offset))
                .collect(),
        }
    }
}

// Manual impls — a position is a handful of references and integers.

impl<T, P: Policy, const B: u32> Clone for Pos<'_, T, P, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P: Policy, const B: u32> Copy for Pos<'_, T, P, B> {}
