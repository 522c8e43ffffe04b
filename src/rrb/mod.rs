//! Relaxed radix-balanced tree (RRB-tree) engine.
//!
//! A tree is a handle `{ size, shift, root, tail }`. Leaves live at shift 0,
//! the root at `shift >= B`. The most recently appended elements sit in the
//! `tail` leaf outside the tree, so most pushes touch a single node.
//!
//! Inner nodes are *regular* (children packed to capacity, indexed by bit
//! arithmetic) until slicing or concatenation disturbs the packing; such nodes
//! become *relaxed* and carry a cumulative size table.

pub mod iter;
pub mod node;
mod ops;
pub(crate) mod position;
pub mod tree;

pub use iter::Iter;
pub use node::{Node, NodePtr};
pub use tree::RrbTree;

/// Default branching bits: 32-way inner nodes and 32-element leaves.
pub const DEFAULT_BITS: u32 = 5;

/// Number of slots in a node with `bits` branching bits.
#[inline]
#[must_use]
pub(crate) const fn branches(bits: u32) -> usize {
    1 << bits
}

