//! Compressed hash-array mapped prefix-tree (CHAMP) engine.
//!
//! Every inner node keeps two disjoint 32-bit bitmaps: `data_map` marks hash
//! fragments stored inline as entries, `node_map` marks fragments delegated to
//! a child subtree. Both arrays are kept compact (indexed by popcount), so the
//! same set of keys always produces the same trie, whatever the insertion
//! order. Keys whose full 64-bit hashes collide end up in a collision node
//! below [`MAX_SHIFT`].

use std::hash::{BuildHasherDefault, DefaultHasher};

pub mod iter;
pub mod node;
mod ops;
pub mod tree;

pub use iter::Iter;
pub use node::{Entry, Node, NodePtr};
pub use ops::diff::Change;
pub use tree::ChampTree;

/// Bits per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Maximum bit-shift value (depth 12, last level uses 4 bits).
pub const MAX_SHIFT: u32 = 60;

/// Hasher used when none is given: deterministic, so equal key sets hash to
/// equal tries across handles and runs.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;
