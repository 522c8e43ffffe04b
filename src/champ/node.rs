//! CHAMP trie node types and bitmap helpers.

use std::fmt;

use super::{BITS_PER_LEVEL, MAX_SHIFT};
use crate::error::{Result, TreeError};
use crate::policy::{Edit, Policy, can_mutate};

/// Shared pointer to a CHAMP node under policy `P`.
pub type NodePtr<K, V, P> = <P as Policy>::Ptr<Node<K, V, P>>;

/// Inline entry storing a key-value pair with its precomputed hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// Precomputed 64-bit hash of the key.
    pub hash: u64,
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

/// CHAMP trie node.
///
/// Two variants maintain the canonical form invariant:
/// - [`Inner`](Self::Inner) — bitmap-compressed node at shift `<= MAX_SHIFT`
/// - [`Collision`](Self::Collision) — linear node for full 64-bit hash collisions
pub enum Node<K, V, P: Policy> {
    /// Bitmap-compressed inner node.
    ///
    /// Invariant: `data_map & node_map == 0` (disjoint positions),
    /// `entries.len() == data_map.count_ones()`,
    /// `children.len() == node_map.count_ones()`.
    Inner {
        /// Bitmap of positions occupied by inline entries.
        data_map: u32,
        /// Bitmap of positions occupied by child subtrees.
        node_map: u32,
        /// Inline entries, in fragment order.
        entries: Vec<Entry<K, V>>,
        /// Child subtrees, in fragment order.
        children: Vec<NodePtr<K, V, P>>,
        /// Session that last claimed this node for in-place edits.
        owner: Option<Edit>,
    },
    /// Collision node for keys sharing the same 64-bit hash.
    ///
    /// Invariant: `entries.len() >= 2`.
    Collision {
        /// The shared 64-bit hash value.
        hash: u64,
        /// Colliding entries, in insertion order.
        entries: Vec<Entry<K, V>>,
        /// Session that last claimed this node for in-place edits.
        owner: Option<Edit>,
    },
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
#[must_use]
pub const fn fragment(hash: u64, shift: u32) -> u32 {
    ((hash >> shift) & 0x1F) as u32
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
#[must_use]
pub const fn mask(frag: u32) -> u32 {
    1 << frag
}

/// Returns the compact index of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
#[must_use]
pub const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<K, V, P: Policy> Node<K, V, P> {
    /// Creates an inner node with no entries and no children (the root of an
    /// empty trie).
    #[must_use]
    pub const fn empty() -> Self {
        Self::Inner {
            data_map: 0,
            node_map: 0,
            entries: Vec::new(),
            children: Vec::new(),
            owner: None,
        }
    }

    /// Rebuilds an inner node from raw bitmaps and compacted arrays.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTree`] if the bitmaps overlap or disagree
    /// with the array lengths.
    pub fn inner(
        data_map: u32,
        node_map: u32,
        entries: Vec<Entry<K, V>>,
        children: Vec<NodePtr<K, V, P>>,
    ) -> Result<Self> {
        if data_map & node_map != 0 {
            return Err(TreeError::invalid(format!(
                "bitmaps overlap: {data_map:#034b} & {node_map:#034b}"
            )));
        }
        if entries.len() != data_map.count_ones() as usize {
            return Err(TreeError::invalid(format!(
                "data_map has {} bits for {} entries",
                data_map.count_ones(),
                entries.len()
            )));
        }
        if children.len() != node_map.count_ones() as usize {
            return Err(TreeError::invalid(format!(
                "node_map has {} bits for {} children",
                node_map.count_ones(),
                children.len()
            )));
        }
        Ok(Self::Inner {
            data_map,
            node_map,
            entries,
            children,
            owner: None,
        })
    }

    /// Rebuilds a collision node.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTree`] for fewer than two entries, and
    /// [`TreeError::HashMismatch`] if an entry's hash differs from `hash`.
    pub fn collision(hash: u64, entries: Vec<Entry<K, V>>) -> Result<Self> {
        if entries.len() < 2 {
            return Err(TreeError::invalid(format!(
                "collision node with {} entries",
                entries.len()
            )));
        }
        if let Some(entry) = entries.iter().find(|entry| entry.hash != hash) {
            return Err(TreeError::HashMismatch {
                stored: hash,
                computed: entry.hash,
            });
        }
        Ok(Self::Collision {
            hash,
            entries,
            owner: None,
        })
    }

    /// Returns `true` for collision nodes.
    #[must_use]
    pub const fn is_collision(&self) -> bool {
        matches!(self, Self::Collision { .. })
    }

    /// Bitmap of inline entries (0 for collision nodes).
    #[must_use]
    pub const fn data_map(&self) -> u32 {
        match self {
            Self::Inner { data_map, .. } => *data_map,
            Self::Collision { .. } => 0,
        }
    }

    /// Bitmap of child subtrees (0 for collision nodes).
    #[must_use]
    pub const fn node_map(&self) -> u32 {
        match self {
            Self::Inner { node_map, .. } => *node_map,
            Self::Collision { .. } => 0,
        }
    }

    /// Inline entries.
    #[must_use]
    pub fn entries(&self) -> &[Entry<K, V>] {
        match self {
            Self::Inner { entries, .. } | Self::Collision { entries, .. } => entries,
        }
    }

    /// Child subtrees (always empty for collision nodes).
    #[must_use]
    pub fn children(&self) -> &[NodePtr<K, V, P>] {
        match self {
            Self::Inner { children, .. } => children,
            Self::Collision { .. } => &[],
        }
    }

    /// Returns the number of inline data entries.
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.entries().len()
    }

    /// Returns the number of child subtrees (always 0 for collision nodes).
    #[must_use]
    pub fn children_len(&self) -> usize {
        self.children().len()
    }

    /// Session that last claimed this node, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<Edit> {
        match self {
            Self::Inner { owner, .. } | Self::Collision { owner, .. } => *owner,
        }
    }

    /// Returns `true` if a parent should store this node's only entry inline
    /// instead of the node itself.
    pub(crate) const fn is_single_entry(&self) -> bool {
        match self {
            Self::Inner {
                entries, children, ..
            } => entries.len() == 1 && children.is_empty(),
            Self::Collision { entries, .. } => entries.len() == 1,
        }
    }

    pub(crate) fn into_entries(self) -> Vec<Entry<K, V>> {
        match self {
            Self::Inner { entries, .. } | Self::Collision { entries, .. } => entries,
        }
    }

    const fn claim(&mut self, edit: Option<Edit>) {
        if edit.is_none() {
            return;
        }
        match self {
            Self::Inner { owner, .. } | Self::Collision { owner, .. } => *owner = edit,
        }
    }
}

impl<K: Clone, V: Clone, P: Policy> Node<K, V, P> {
    /// Copies the node: entries are cloned, child pointers shared.
    fn copy_for(&self, edit: Option<Edit>) -> Self {
        match self {
            Self::Inner {
                data_map,
                node_map,
                entries,
                children,
                ..
            } => Self::Inner {
                data_map: *data_map,
                node_map: *node_map,
                entries: entries.clone(),
                children: children.clone(),
                owner: edit,
            },
            Self::Collision { hash, entries, .. } => Self::Collision {
                hash: *hash,
                entries: entries.clone(),
                owner: edit,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Copy-on-write helpers
// ---------------------------------------------------------------------------

/// Returns the node behind `ptr` ready for in-place edits, replacing it with a
/// private copy first unless `ptr` is its only reference.
pub(crate) fn edit_node<K: Clone, V: Clone, P: Policy>(
    ptr: &mut NodePtr<K, V, P>,
    edit: Option<Edit>,
) -> &mut Node<K, V, P> {
    if !can_mutate::<P, Node<K, V, P>>(ptr) {
        let copy = ptr.copy_for(edit);
        *ptr = P::alloc(copy);
    }
    let node = P::get_mut::<Node<K, V, P>>(ptr).expect("node is uniquely owned after copy-on-write");
    node.claim(edit);
    node
}

/// Moves the single entry out of a node that [`is_single_entry`](Node::is_single_entry),
/// cloning it when the node is still shared.
pub(crate) fn take_single_entry<K: Clone, V: Clone, P: Policy>(ptr: NodePtr<K, V, P>) -> Entry<K, V> {
    match P::try_unwrap::<Node<K, V, P>>(ptr) {
        Ok(node) => node.into_entries().swap_remove(0),
        Err(shared) => shared.entries()[0].clone(),
    }
}

/// Builds the subtree holding two entries whose fragments agree above `shift`.
///
/// Descends until the fragments differ, or creates a collision node once the
/// whole hash is consumed.
pub(crate) fn create_subtree<K, V, P: Policy>(
    e1: Entry<K, V>,
    e2: Entry<K, V>,
    shift: u32,
) -> NodePtr<K, V, P> {
    if shift > MAX_SHIFT {
        tracing::trace!(hash = e1.hash, "collision node created");
        return P::alloc(Node::<K, V, P>::Collision {
            hash: e1.hash,
            entries: vec![e1, e2],
            owner: None,
        });
    }

    let f1 = fragment(e1.hash, shift);
    let f2 = fragment(e2.hash, shift);

    if f1 == f2 {
        let child = create_subtree::<K, V, P>(e1, e2, shift + BITS_PER_LEVEL);
        P::alloc(Node::<K, V, P>::Inner {
            data_map: 0,
            node_map: mask(f1),
            entries: Vec::new(),
            children: vec![child],
            owner: None,
        })
    } else {
        let entries = if f1 < f2 { vec![e1, e2] } else { vec![e2, e1] };
        P::alloc(Node::<K, V, P>::Inner {
            data_map: mask(f1) | mask(f2),
            node_map: 0,
            entries,
            children: Vec::new(),
            owner: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Manual trait impls — avoid false `K: Debug, V: Debug, P: Debug` bounds.
// ---------------------------------------------------------------------------

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("hash", &format_args!("{:#018x}", self.hash))
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

impl<K, V, P: Policy> fmt::Debug for Node<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner {
                data_map,
                node_map,
                owner,
                ..
            } => f
                .debug_struct("Inner")
                .field("data_map", &format_args!("{data_map:#034b}"))
                .field("node_map", &format_args!("{node_map:#034b}"))
                .field("owner", owner)
                .finish_non_exhaustive(),
            Self::Collision {
                hash,
                entries,
                owner,
            } => f
                .debug_struct("Collision")
                .field("hash", hash)
                .field("entries_len", &entries.len())
                .field("owner", owner)
                .finish(),
        }
    }
}
