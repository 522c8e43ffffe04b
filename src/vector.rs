//! Persistent vector façade over the RRB engine.

use std::fmt;
use std::ops;

use crate::policy::{ArcPolicy, Edit, Policy, RcPolicy};
use crate::rrb::{Iter, RrbTree};

/// Persistent random-access sequence with cheap slicing and concatenation.
///
/// Every modifying method returns a new vector and leaves `self` untouched;
/// both share all nodes the edit did not reach. Use [`transient`](Self::transient)
/// for a batch of in-place edits.
pub struct Vector<T, P: Policy = RcPolicy> {
    tree: RrbTree<T, P>,
}

/// Thread-safe [`Vector`], `Send + Sync` when `T` is.
pub type VectorSync<T> = Vector<T, ArcPolicy>;

// ---------------------------------------------------------------------------
// Construction & reads — no trait bounds
// ---------------------------------------------------------------------------

impl<T, P: Policy> Vector<T, P> {
    /// Creates an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RrbTree::new(),
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the vector holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the element at `index`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.tree.get(index)
    }

    /// Returns the first element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Returns the last element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// Returns an iterator over the elements in order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, P> {
        self.tree.iter()
    }

    /// The underlying tree.
    #[must_use]
    pub const fn tree(&self) -> &RrbTree<T, P> {
        &self.tree
    }
}

// ---------------------------------------------------------------------------
// Persistent operations — T: Clone
// ---------------------------------------------------------------------------

impl<T: Clone, P: Policy> Vector<T, P> {
    /// Returns a vector with `value` appended.
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        self.tree.push_back(value).into()
    }

    /// Returns a vector with `value` prepended.
    #[must_use]
    pub fn push_front(&self, value: T) -> Self {
        self.tree.push_front(value).into()
    }

    /// Returns a vector with the element at `index` replaced by `value`, or
    /// `None` if `index` is out of bounds.
    #[must_use]
    pub fn set(&self, index: usize, value: T) -> Option<Self> {
        self.tree.set(index, value).map(Self::from)
    }

    /// Returns a vector with the element at `index` replaced by `f(element)`,
    /// or `None` if `index` is out of bounds.
    #[must_use]
    pub fn update<F: FnOnce(&T) -> T>(&self, index: usize, f: F) -> Option<Self> {
        self.tree.update(index, f).map(Self::from)
    }

    /// Returns the first `n` elements.
    #[must_use]
    pub fn take(&self, n: usize) -> Self {
        self.tree.take(n).into()
    }

    /// Returns everything after the first `n` elements.
    #[must_use]
    pub fn skip(&self, n: usize) -> Self {
        self.tree.skip(n).into()
    }

    /// Returns `self` followed by `other`.
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        self.tree.concat(&other.tree).into()
    }

    /// Returns a vector with `value` inserted before `index`.
    ///
    /// An `index` past the end appends.
    #[must_use]
    pub fn insert(&self, index: usize, value: T) -> Self {
        self.tree.insert(index, value).into()
    }

    /// Returns a vector without the element at `index`.
    ///
    /// An `index` past the end returns an unchanged copy.
    #[must_use]
    pub fn remove(&self, index: usize) -> Self {
        self.tree.erase(index).into()
    }

    /// Starts a transient editing session seeded with this vector.
    #[must_use]
    pub fn transient(&self) -> TransientVector<T, P> {
        TransientVector {
            tree: self.tree.clone(),
            edit: Edit::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transient
// ---------------------------------------------------------------------------

/// Mutable editing session over a [`Vector`].
///
/// Nodes created during the session are edited in place on later calls; nodes
/// still reachable from any persistent vector are copied first.
pub struct TransientVector<T, P: Policy = RcPolicy> {
    tree: RrbTree<T, P>,
    edit: Edit,
}

impl<T, P: Policy> TransientVector<T, P> {
    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the session holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.tree.get(index)
    }

    /// Freezes the session into a persistent vector.
    #[must_use]
    pub fn persistent(self) -> Vector<T, P> {
        self.tree.into()
    }
}

impl<T: Clone, P: Policy> TransientVector<T, P> {
    /// Appends `value`.
    pub fn push_back(&mut self, value: T) {
        self.tree.push_back_mut(Some(self.edit), value);
    }

    /// Prepends `value`.
    pub fn push_front(&mut self, value: T) {
        self.tree.push_front_mut(Some(self.edit), value);
    }

    /// Replaces the element at `index`. Returns `false` if out of bounds.
    pub fn set(&mut self, index: usize, value: T) -> bool {
        self.tree.update_mut(Some(self.edit), index, |_| value)
    }

    /// Replaces the element at `index` with `f(element)`. Returns `false` if
    /// out of bounds.
    pub fn update<F: FnOnce(&T) -> T>(&mut self, index: usize, f: F) -> bool {
        self.tree.update_mut(Some(self.edit), index, f)
    }

    /// Keeps only the first `n` elements.
    pub fn take(&mut self, n: usize) {
        self.tree.take_mut(Some(self.edit), n);
    }

    /// Drops the first `n` elements.
    pub fn skip(&mut self, n: usize) {
        self.tree.skip_mut(Some(self.edit), n);
    }

    /// Appends every element of `other`.
    pub fn append(&mut self, other: &Vector<T, P>) {
        self.tree.concat_mut(Some(self.edit), &other.tree);
    }

    /// Snapshots the current contents as a persistent vector.
    ///
    /// Nodes shared with the snapshot are copied before the next in-place edit,
    /// so the snapshot never changes.
    #[must_use]
    pub fn checkpoint(&self) -> Vector<T, P> {
        self.tree.clone().into()
    }

    /// Restores the contents saved by [`checkpoint`](Self::checkpoint).
    pub fn rollback(&mut self, snapshot: Vector<T, P>) {
        self.tree = snapshot.tree;
    }
}

impl<T: fmt::Debug, P: Policy> fmt::Debug for TransientVector<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientVector")
            .field("edit", &self.edit)
            .field("items", &self.tree)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<T, P: Policy> From<RrbTree<T, P>> for Vector<T, P> {
    fn from(tree: RrbTree<T, P>) -> Self {
        Self { tree }
    }
}

impl<T, P: Policy> Clone for Vector<T, P> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T, P: Policy> Default for Vector<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, P: Policy> fmt::Debug for Vector<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, P: Policy> PartialEq for Vector<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, P: Policy> Eq for Vector<T, P> {}

impl<T: Clone, P: Policy> Extend<T> for Vector<T, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let edit = Edit::new();
        for value in iter {
            self.tree.push_back_mut(Some(edit), value);
        }
    }
}

impl<T: Clone, P: Policy> FromIterator<T> for Vector<T, P> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Self::new();
        vector.extend(iter);
        vector
    }
}

impl<T, P: Policy> ops::Index<usize> for Vector<T, P> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index).expect("index out of bounds")
    }
}

impl<'a, T, P: Policy> IntoIterator for &'a Vector<T, P> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, P>;

    fn into_iter(self) -> Iter<'a, T, P> {
        self.iter()
    }
}
