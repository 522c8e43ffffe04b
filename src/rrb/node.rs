//! RRB-tree node types and copy-on-write helpers.

use std::fmt;

use super::branches;
use crate::error::{Result, TreeError};
use crate::policy::{Edit, Policy, can_mutate};

/// Shared pointer to an RRB node under policy `P`.
pub type NodePtr<T, P> = <P as Policy>::Ptr<Node<T, P>>;

/// RRB-tree node.
///
/// - [`Leaf`](Self::Leaf): dense run of up to `2^B` elements, always at shift 0.
/// - [`Inner`](Self::Inner): up to `2^B` children one level (`B` bits) down.
///   Without a size table the node is *regular*: every child except the last
///   holds exactly `2^shift` elements. With one it is *relaxed*.
pub enum Node<T, P: Policy> {
    /// Dense element array.
    Leaf {
        /// Live elements, in order.
        items: Vec<T>,
        /// Session that last claimed this node for in-place edits.
        owner: Option<Edit>,
    },
    /// Inner node.
    ///
    /// Invariant (relaxed): `sizes.len() == children.len()`, entries strictly
    /// increasing, last entry equal to the subtree size.
    Inner {
        /// Child subtrees, in order.
        children: Vec<NodePtr<T, P>>,
        /// Cumulative subtree sizes; `None` for regular nodes.
        sizes: Option<Vec<usize>>,
        /// Session that last claimed this node for in-place edits.
        owner: Option<Edit>,
    },
}

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<T, P: Policy> Node<T, P> {
    /// Creates a leaf holding `items`.
    #[must_use]
    pub const fn leaf(items: Vec<T>) -> Self {
        Self::Leaf { items, owner: None }
    }

    /// Creates a regular inner node.
    #[must_use]
    pub const fn inner(children: Vec<NodePtr<T, P>>) -> Self {
        Self::Inner {
            children,
            sizes: None,
            owner: None,
        }
    }

    /// Creates a relaxed inner node from children and their cumulative sizes.
    #[must_use]
    pub const fn relaxed(children: Vec<NodePtr<T, P>>, sizes: Vec<usize>) -> Self {
        Self::Inner {
            children,
            sizes: Some(sizes),
            owner: None,
        }
    }

    /// Returns `true` for leaves.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Returns `true` for inner nodes carrying a size table.
    #[must_use]
    pub const fn is_relaxed(&self) -> bool {
        matches!(self, Self::Inner { sizes: Some(_), .. })
    }

    /// Number of live slots: elements of a leaf, children of an inner node.
    #[must_use]
    pub const fn count(&self) -> usize {
        match self {
            Self::Leaf { items, .. } => items.len(),
            Self::Inner { children, .. } => children.len(),
        }
    }

    /// Elements of a leaf; empty for inner nodes.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Leaf { items, .. } => items,
            Self::Inner { .. } => &[],
        }
    }

    /// Children of an inner node; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[NodePtr<T, P>] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Inner { children, .. } => children,
        }
    }

    /// Cumulative size table of a relaxed node.
    #[must_use]
    pub fn sizes(&self) -> Option<&[usize]> {
        match self {
            Self::Inner {
                sizes: Some(sizes), ..
            } => Some(sizes),
            _ => None,
        }
    }

    /// Session that last claimed this node, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<Edit> {
        match self {
            Self::Leaf { owner, .. } | Self::Inner { owner, .. } => *owner,
        }
    }

    pub(crate) fn items_mut(&mut self) -> &mut Vec<T> {
        match self {
            Self::Leaf { items, .. } => items,
            Self::Inner { .. } => unreachable!("expected a leaf"),
        }
    }

    pub(crate) fn inner_mut(&mut self) -> (&mut Vec<NodePtr<T, P>>, &mut Option<Vec<usize>>) {
        match self {
            Self::Inner {
                children, sizes, ..
            } => (children, sizes),
            Self::Leaf { .. } => unreachable!("expected an inner node"),
        }
    }

    /// Stamps the node for `edit` and reserves headroom on first claim.
    fn claim(&mut self, edit: Option<Edit>, capacity: usize) {
        if edit.is_none() || self.owner() == edit {
            return;
        }
        match self {
            Self::Leaf { items, owner } => {
                items.reserve_exact(capacity.saturating_sub(items.len()));
                *owner = edit;
            }
            Self::Inner {
                children,
                sizes,
                owner,
            } => {
                children.reserve_exact(capacity.saturating_sub(children.len()));
                if let Some(sizes) = sizes {
                    sizes.reserve_exact(capacity.saturating_sub(sizes.len()));
                }
                *owner = edit;
            }
        }
    }
}

impl<T: Clone, P: Policy> Node<T, P> {
    /// Creates a leaf by cloning `items`, reporting allocation failure instead
    /// of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::OutOfMemory`] if storage cannot be reserved.
    pub fn leaf_from_slice(items: &[T]) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(items.len())
            .map_err(|_| TreeError::OutOfMemory {
                requested: items.len(),
            })?;
        buf.extend_from_slice(items);
        Ok(Self::leaf(buf))
    }

    /// Copies the node: elements are cloned, child pointers shared.
    ///
    /// Copies made for an edit session get `capacity` slots of headroom;
    /// persistent copies are sized exactly.
    fn copy_for(&self, edit: Option<Edit>, capacity: usize) -> Self {
        let cap = |len: usize| if edit.is_some() { capacity.max(len) } else { len };
        match self {
            Self::Leaf { items, .. } => {
                let mut copy = Vec::with_capacity(cap(items.len()));
                copy.extend_from_slice(items);
                Self::Leaf {
                    items: copy,
                    owner: edit,
                }
            }
            Self::Inner {
                children, sizes, ..
            } => {
                let mut copy = Vec::with_capacity(cap(children.len()));
                copy.extend(children.iter().cloned());
                let sizes = sizes.as_ref().map(|sizes| {
                    let mut table = Vec::with_capacity(cap(sizes.len()));
                    table.extend_from_slice(sizes);
                    table
                });
                Self::Inner {
                    children: copy,
                    sizes,
                    owner: edit,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Copy-on-write helpers
// ---------------------------------------------------------------------------

/// Returns the node behind `ptr` ready for in-place edits, replacing it with a
/// private copy first unless `ptr` is its only reference.
pub(crate) fn edit_node<T: Clone, P: Policy, const B: u32>(
    ptr: &mut NodePtr<T, P>,
    edit: Option<Edit>,
) -> &mut Node<T, P> {
    if !can_mutate::<P, Node<T, P>>(ptr) {
        let copy = ptr.copy_for(edit, branches(B));
        *ptr = P::alloc(copy);
    }
    let node = P::get_mut::<Node<T, P>>(ptr).expect("node is uniquely owned after copy-on-write");
    node.claim(edit, branches(B));
    node
}

/// Wraps `node` in single-child regular inner nodes until it sits at `shift`.
pub(crate) fn make_path<T, P: Policy, const B: u32>(shift: u32, node: NodePtr<T, P>) -> NodePtr<T, P> {
    let mut path = node;
    let mut level = 0;
    while level < shift {
        path = P::alloc(Node::<T, P>::inner(vec![path]));
        level += B;
    }
    path
}

/// Returns `true` if the two pointers are the same node.
#[must_use]
pub fn same_node<T, P: Policy>(a: &NodePtr<T, P>, b: &NodePtr<T, P>) -> bool {
    P::ptr_eq::<Node<T, P>>(a, b)
}

// ---------------------------------------------------------------------------
// Manual trait impls — avoid false `T: Debug, P: Debug` bounds.
// ---------------------------------------------------------------------------

impl<T, P: Policy> fmt::Debug for Node<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { items, owner } => f
                .debug_struct("Leaf")
                .field("len", &items.len())
                .field("owner", owner)
                .finish(),
            Self::Inner {
                children,
                sizes,
                owner,
            } => f
                .debug_struct("Inner")
                .field("children", &children.len())
                .field("sizes", sizes)
                .field("owner", owner)
                .finish(),
        }
    }
}
