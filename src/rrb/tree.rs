//! The RRB-tree handle: persistent operations and their transient `_mut`
//! counterparts.

use std::fmt;

use tracing::trace;

use super::iter::Iter;
use super::node::{Node, NodePtr, edit_node, make_path};
use super::ops::check::check_tree;
use super::ops::concat::concat_sub_tree;
use super::ops::get::{Chunks, LeafLookup, Lookup};
use super::ops::push::{has_front_room, push_front_into, push_tail, relax};
use super::ops::slice::{skip_root, take_root};
use super::ops::update::update_in;
use super::position::Pos;
use super::{DEFAULT_BITS, branches};
use crate::error::Result;
use crate::policy::{Edit, Policy, RcPolicy, can_mutate};

/// Persistent sequence backed by a relaxed radix-balanced tree.
///
/// Cloning is O(1) and shares every node. Persistent operations take `&self`
/// and return a new handle; the `_mut` forms edit the handle in place, reusing
/// nodes no other handle can observe. Passing an [`Edit`] to a `_mut` method
/// additionally stamps the nodes it touches so later edits in the same session
/// grow them without reallocating.
pub struct RrbTree<T, P: Policy = RcPolicy, const B: u32 = DEFAULT_BITS> {
    size: usize,
    shift: u32,
    root: NodePtr<T, P>,
    tail: NodePtr<T, P>,
}

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<T, P: Policy, const B: u32> RrbTree<T, P, B> {
    const BITS_OK: () = assert!(B >= 1 && B <= 10, "branching bits must be in 1..=10");

    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        let () = Self::BITS_OK;
        Self {
            size: 0,
            shift: B,
            root: P::alloc(Node::<T, P>::inner(Vec::new())),
            tail: P::alloc(Node::<T, P>::leaf(Vec::new())),
        }
    }

    /// Rebuilds a tree from its raw parts, validating every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTree`](crate::TreeError::InvalidTree) if the
    /// parts do not form a well-formed tree.
    pub fn from_raw_parts(
        size: usize,
        shift: u32,
        root: NodePtr<T, P>,
        tail: NodePtr<T, P>,
    ) -> Result<Self> {
        let () = Self::BITS_OK;
        check_tree::<T, P, B>(size, shift, &root, &tail)?;
        Ok(Self {
            size,
            shift,
            root,
            tail,
        })
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the tree holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Shift of the root: `B` times the number of inner levels.
    #[must_use]
    pub const fn shift(&self) -> u32 {
        self.shift
    }

    /// Number of levels, leaves included.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.shift / B + 1
    }

    /// Root inner node.
    #[must_use]
    pub const fn root(&self) -> &NodePtr<T, P> {
        &self.root
    }

    /// Tail leaf holding the last elements.
    #[must_use]
    pub const fn tail(&self) -> &NodePtr<T, P> {
        &self.tail
    }

    /// Index of the first element stored in the tail.
    #[must_use]
    pub fn tail_offset(&self) -> usize {
        self.size - self.tail.count()
    }

    /// Returns the element at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        let tail_offset = self.tail_offset();
        if index >= tail_offset {
            return self.tail.items().get(index - tail_offset);
        }
        Some(Pos::<T, P, B>::new(&self.root, self.shift, tail_offset).visit(&mut Lookup { index }))
    }

    /// First element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Last element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tail.items().last()
    }

    /// Returns the leaf holding `index` and the index of its first element.
    pub(crate) fn leaf_for(&self, index: usize) -> (&[T], usize) {
        let tail_offset = self.tail_offset();
        if index >= tail_offset {
            return (self.tail.items(), tail_offset);
        }
        Pos::<T, P, B>::new(&self.root, self.shift, tail_offset)
            .visit(&mut LeafLookup { index, base: 0 })
    }

    /// Iterates over the elements in order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, P, B> {
        Iter::new(self)
    }

    /// Calls `f` with every leaf's elements, in order.
    ///
    /// Each slice is a maximal contiguous run, suited to bulk copies.
    pub fn for_each_chunk<'a, F: FnMut(&'a [T])>(&'a self, mut f: F) {
        let root_size = self.tail_offset();
        if root_size > 0 {
            Pos::<T, P, B>::new(&self.root, self.shift, root_size).visit(&mut Chunks { f: &mut f });
        }
        if !self.tail.items().is_empty() {
            f(self.tail.items());
        }
    }

    /// Verifies every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTree`](crate::TreeError::InvalidTree)
    /// describing the first violation found.
    pub fn check(&self) -> Result<()> {
        check_tree::<T, P, B>(self.size, self.shift, &self.root, &self.tail)
    }

    /// Runs [`check`](Self::check) after a mutation when the `deep-check`
    /// feature is on.
    #[inline]
    fn debug_check(&self, op: &'static str) {
        if cfg!(feature = "deep-check")
            && let Err(err) = self.check()
        {
            tracing::error!(op, %err, "tree invariant broken");
        }
    }

    /// Empties the root, in place when no other handle shares it.
    #[allow(clippy::option_if_let_else)]
    fn clear_root(&mut self) {
        if let Some(root) = P::get_mut::<Node<T, P>>(&mut self.root) {
            let (children, sizes) = root.inner_mut();
            children.clear();
            *sizes = None;
        } else {
            self.root = P::alloc(Node::<T, P>::inner(Vec::new()));
        }
        self.shift = B;
    }

    #[allow(clippy::option_if_let_else)]
    fn reset(&mut self) {
        self.clear_root();
        if let Some(tail) = P::get_mut::<Node<T, P>>(&mut self.tail) {
            tail.items_mut().clear();
        } else {
            self.tail = P::alloc(Node::<T, P>::leaf(Vec::new()));
        }
        self.size = 0;
    }

    /// Removes single-child levels above the leaves.
    fn collapse(&mut self) {
        while self.shift > B && self.root.count() == 1 {
            let child = self.root.children()[0].clone();
            self.root = child;
            self.shift -= B;
            trace!(shift = self.shift, "root collapsed a level");
        }
    }
}

// ---------------------------------------------------------------------------
// Operations — require T: Clone
// ---------------------------------------------------------------------------

impl<T: Clone, P: Policy, const B: u32> RrbTree<T, P, B> {
    // -- persistent ---------------------------------------------------------

    /// Returns a tree with `value` appended.
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        let mut tree = self.clone();
        tree.push_back_mut(None, value);
        tree
    }

    /// Returns a tree with `value` prepended.
    #[must_use]
    pub fn push_front(&self, value: T) -> Self {
        let mut tree = self.clone();
        tree.push_front_mut(None, value);
        tree
    }

    /// Returns a tree with the element at `index` replaced by `f(old)`, or
    /// `None` past the end.
    #[must_use]
    pub fn update<F: FnOnce(&T) -> T>(&self, index: usize, f: F) -> Option<Self> {
        let mut tree = self.clone();
        tree.update_mut(None, index, f).then_some(tree)
    }

    /// Returns a tree with the element at `index` replaced by `value`, or
    /// `None` past the end.
    #[must_use]
    pub fn set(&self, index: usize, value: T) -> Option<Self> {
        self.update(index, |_| value)
    }

    /// Returns the first `n` elements.
    #[must_use]
    pub fn take(&self, n: usize) -> Self {
        let mut tree = self.clone();
        tree.take_mut(None, n);
        tree
    }

    /// Returns everything after the first `n` elements.
    #[must_use]
    pub fn skip(&self, n: usize) -> Self {
        let mut tree = self.clone();
        tree.skip_mut(None, n);
        tree
    }

    /// Returns the elements of `self` followed by those of `other`.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut tree = self.clone();
        tree.concat_mut(None, other);
        tree
    }

    /// Returns a tree with `value` inserted before position `index`
    /// (clamped to the length).
    #[must_use]
    pub fn insert(&self, index: usize, value: T) -> Self {
        let index = index.min(self.size);
        self.take(index).push_back(value).concat(&self.skip(index))
    }

    /// Returns a tree without the element at `index`; unchanged past the end.
    #[must_use]
    pub fn erase(&self, index: usize) -> Self {
        if index >= self.size {
            return self.clone();
        }
        self.take(index).concat(&self.skip(index + 1))
    }

    // -- transient ----------------------------------------------------------

    /// Appends `value` in place.
    pub fn push_back_mut(&mut self, edit: Option<Edit>, value: T) {
        if self.tail.count() < branches(B) {
            edit_node::<T, P, B>(&mut self.tail, edit).items_mut().push(value);
        } else {
            let mut items = Vec::with_capacity(branches(B));
            items.push(value);
            let fresh = P::alloc(Node::<T, P>::leaf(items));
            let full = std::mem::replace(&mut self.tail, fresh);
            let root_size = self.size - branches(B);
            push_tail::<T, P, B>(&mut self.root, &mut self.shift, root_size, full, branches(B), edit);
        }
        self.size += 1;
        self.debug_check("push_back");
    }

    /// Prepends `value` in place.
    pub fn push_front_mut(&mut self, edit: Option<Edit>, value: T) {
        if self.size == 0 {
            self.push_back_mut(edit, value);
            return;
        }
        let root_size = self.tail_offset();
        if root_size == 0 {
            if self.tail.count() < branches(B) {
                edit_node::<T, P, B>(&mut self.tail, edit).items_mut().insert(0, value);
            } else {
                let leaf = P::alloc(Node::<T, P>::leaf(vec![value]));
                let path = make_path::<T, P, B>(self.shift - B, leaf);
                self.root = P::alloc(Node::<T, P>::relaxed(vec![path], vec![1]));
            }
        } else if has_front_room(Pos::<T, P, B>::new(&self.root, self.shift, root_size)) {
            push_front_into::<T, P, B>(&mut self.root, self.shift, root_size, value, edit);
        } else {
            let leaf = P::alloc(Node::<T, P>::leaf(vec![value]));
            let path = make_path::<T, P, B>(self.shift, leaf);
            let root = P::alloc(Node::<T, P>::relaxed(vec![path, self.root.clone()], vec![1, root_size + 1]));
            self.root = root;
            self.shift += B;
            trace!(shift = self.shift, "root grew a level at the front");
        }
        self.size += 1;
        self.relax_partial_root(edit);
        self.debug_check("push_front");
    }

    /// Replaces the element at `index` with `f(old)` in place.
    ///
    /// Returns `false`, leaving the tree untouched, if `index` is past the end.
    /// `f` runs before any node is copied, so a panic in it changes nothing.
    pub fn update_mut<F: FnOnce(&T) -> T>(&mut self, edit: Option<Edit>, index: usize, f: F) -> bool {
        let Some(old) = self.get(index) else {
            return false;
        };
        let value = f(old);
        let tail_offset = self.tail_offset();
        if index >= tail_offset {
            edit_node::<T, P, B>(&mut self.tail, edit).items_mut()[index - tail_offset] = value;
        } else {
            update_in::<T, P, B, _>(
                &mut self.root,
                self.shift,
                tail_offset,
                index,
                |slot| *slot = value,
                edit,
            );
        }
        self.debug_check("update");
        true
    }

    /// Keeps only the first `n` elements.
    pub fn take_mut(&mut self, edit: Option<Edit>, n: usize) {
        if n >= self.size {
            return;
        }
        if n == 0 {
            self.reset();
            return;
        }
        let tail_offset = self.tail_offset();
        if n > tail_offset {
            let keep = n - tail_offset;
            if can_mutate::<P, Node<T, P>>(&self.tail) {
                edit_node::<T, P, B>(&mut self.tail, edit).items_mut().truncate(keep);
            } else {
                self.tail = P::alloc(Node::<T, P>::leaf(self.tail.items()[..keep].to_vec()));
            }
        } else {
            self.tail = take_root::<T, P, B>(&mut self.root, &mut self.shift, tail_offset, n, edit);
        }
        self.size = n;
        self.relax_partial_root(edit);
        self.debug_check("take");
    }

    /// Drops the first `n` elements.
    pub fn skip_mut(&mut self, edit: Option<Edit>, n: usize) {
        if n == 0 {
            return;
        }
        if n >= self.size {
            self.reset();
            return;
        }
        let tail_offset = self.tail_offset();
        if n >= tail_offset {
            let from = n - tail_offset;
            if can_mutate::<P, Node<T, P>>(&self.tail) {
                edit_node::<T, P, B>(&mut self.tail, edit).items_mut().drain(..from);
            } else {
                self.tail = P::alloc(Node::<T, P>::leaf(self.tail.items()[from..].to_vec()));
            }
            self.clear_root();
        } else {
            skip_root::<T, P, B>(&mut self.root, &mut self.shift, tail_offset, n, edit);
        }
        self.size -= n;
        self.relax_partial_root(edit);
        self.debug_check("skip");
    }

    /// Appends every element of `other` in place.
    ///
    /// The left spine is always copied: the seam is rebuilt from fresh nodes so
    /// that a panicking `Clone` leaves `self` as it was.
    pub fn concat_mut(&mut self, edit: Option<Edit>, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }

        if other.tail_offset() == 0 {
            self.append_tail(edit, other.tail.items(), &other.tail);
        } else {
            let mut root = self.root.clone();
            let mut shift = self.shift;
            let tail_size = self.tail.count();
            push_tail::<T, P, B>(&mut root, &mut shift, self.tail_offset(), self.tail.clone(), tail_size, edit);
            let (shift, root) = concat_sub_tree(
                Pos::<T, P, B>::new(&root, shift, self.size),
                Pos::<T, P, B>::new(&other.root, other.shift, other.tail_offset()),
                true,
            );
            self.root = root;
            self.shift = shift;
            self.tail = other.tail.clone();
            self.collapse();
        }
        self.size += other.size;
        self.relax_partial_root(edit);
        self.debug_check("concat");
    }

    /// Gives a regular root over a partial leaf a size table: a regular root
    /// holds full leaves only, so `tail_offset == (size - 1) & !(2^B - 1)`.
    fn relax_partial_root(&mut self, edit: Option<Edit>) {
        let root_size = self.tail_offset();
        if !root_size.is_multiple_of(branches(B)) && !self.root.is_relaxed() {
            relax::<T, P, B>(&mut self.root, self.shift, root_size, edit);
        }
    }

    /// Appends a right-hand side that consists of its tail only.
    fn append_tail(&mut self, edit: Option<Edit>, items: &[T], leaf: &NodePtr<T, P>) {
        let tail_len = self.tail.count();
        let root_size = self.tail_offset();
        if tail_len == branches(B) {
            let full = std::mem::replace(&mut self.tail, leaf.clone());
            push_tail::<T, P, B>(&mut self.root, &mut self.shift, root_size, full, tail_len, edit);
        } else if tail_len + items.len() <= branches(B) {
            let mut extra = items.to_vec();
            edit_node::<T, P, B>(&mut self.tail, edit).items_mut().append(&mut extra);
        } else {
            let room = branches(B) - tail_len;
            let rest = P::alloc(Node::<T, P>::leaf(items[room..].to_vec()));
            let mut head = items[..room].to_vec();
            edit_node::<T, P, B>(&mut self.tail, edit).items_mut().append(&mut head);
            let full = std::mem::replace(&mut self.tail, rest);
            push_tail::<T, P, B>(&mut self.root, &mut self.shift, root_size, full, branches(B), edit);
        }
    }
}

// ---------------------------------------------------------------------------
// Manual trait impls — avoid false `T: Clone, P: Clone` bounds.
// ---------------------------------------------------------------------------

impl<T, P: Policy, const B: u32> Clone for RrbTree<T, P, B> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            shift: self.shift,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T, P: Policy, const B: u32> Default for RrbTree<T, P, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, P: Policy, const B: u32> fmt::Debug for RrbTree<T, P, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, P: Policy, const B: u32> IntoIterator for &'a RrbTree<T, P, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, P, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
