//! Persistent hash set façade over the CHAMP engine.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use crate::champ::{self, Change, ChampTree, DefaultHashBuilder, Node};
use crate::policy::{ArcPolicy, Edit, Policy, RcPolicy};

/// Persistent hash set: a CHAMP trie with unit values.
pub struct HashSet<T, P: Policy = RcPolicy, S = DefaultHashBuilder> {
    tree: ChampTree<T, (), P, S>,
}

/// Thread-safe [`HashSet`], `Send + Sync` when `T` and `S` are.
pub type HashSetSync<T, S = DefaultHashBuilder> = HashSet<T, ArcPolicy, S>;

impl<T, P: Policy, S: Default> HashSet<T, P, S> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: ChampTree::new(),
        }
    }
}

impl<T, P: Policy, S> HashSet<T, P, S> {
    /// Creates an empty set hashing elements with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            tree: ChampTree::with_hasher(hasher),
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns an iterator over the elements in trie order.
    #[must_use]
    pub fn iter(&self) -> SetIter<'_, T, P> {
        SetIter(self.tree.iter())
    }
}

impl<T: Hash + Eq, P: Policy, S: BuildHasher> HashSet<T, P, S> {
    /// Returns `true` if the set contains `value`.
    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.contains_key(value)
    }
}

impl<T: Eq, P: Policy, S> HashSet<T, P, S> {
    /// Reports elements only in `other` to `added` and elements only in
    /// `self` to `removed`.
    pub fn diff<'a, A, R>(&'a self, other: &'a Self, mut added: A, mut removed: R)
    where
        A: FnMut(&'a T),
        R: FnMut(&'a T),
    {
        self.tree.diff(&other.tree, |change| match change {
            Change::Added(value, ()) => added(value),
            Change::Removed(value, ()) => removed(value),
            Change::Changed { .. } => unreachable!("unit values never differ"),
        });
    }
}

impl<T, P, S> HashSet<T, P, S>
where
    T: Hash + Eq + Clone,
    P: Policy,
    S: BuildHasher + Clone,
{
    /// Returns a set that also holds `value`.
    #[must_use]
    pub fn insert(&self, value: T) -> Self {
        Self {
            tree: self.tree.insert(value, ()),
        }
    }

    /// Returns a set without `value`.
    #[must_use]
    pub fn remove<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            tree: self.tree.remove(value),
        }
    }

    /// Starts a transient editing session seeded with this set.
    #[must_use]
    pub fn transient(&self) -> TransientHashSet<T, P, S> {
        TransientHashSet {
            tree: self.tree.clone(),
            edit: Edit::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transient
// ---------------------------------------------------------------------------

/// Mutable editing session over a [`HashSet`].
pub struct TransientHashSet<T, P: Policy = RcPolicy, S = DefaultHashBuilder> {
    tree: ChampTree<T, (), P, S>,
    edit: Edit,
}

impl<T, P: Policy, S> TransientHashSet<T, P, S> {
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

    /// Freezes the session into a persistent set.
    #[must_use]
    pub fn persistent(self) -> HashSet<T, P, S> {
        HashSet { tree: self.tree }
    }
}

impl<T, P, S> TransientHashSet<T, P, S>
where
    T: Hash + Eq + Clone,
    P: Policy,
    S: BuildHasher + Clone,
{
    /// Returns `true` if the session contains `value`.
    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.contains_key(value)
    }

    /// Adds `value`. Returns `true` if it was not present.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert_mut(Some(self.edit), value, ()).is_none()
    }

    /// Removes `value`. Returns `true` if it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.remove_mut(Some(self.edit), value).is_some()
    }

    /// Snapshots the current contents as a persistent set.
    #[must_use]
    pub fn checkpoint(&self) -> HashSet<T, P, S> {
        HashSet {
            tree: self.tree.clone(),
        }
    }

    /// Restores the contents saved by [`checkpoint`](Self::checkpoint).
    pub fn rollback(&mut self, snapshot: HashSet<T, P, S>) {
        self.tree = snapshot.tree;
    }
}

// ---------------------------------------------------------------------------
// Iterator
// ---------------------------------------------------------------------------

/// Iterator over the elements of a [`HashSet`].
pub struct SetIter<'a, T, P: Policy>(champ::Iter<'a, T, (), P>);

impl<'a, T, P: Policy> Iterator for SetIter<'a, T, P> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.0.next().map(|(value, ())| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T, P: Policy> ExactSizeIterator for SetIter<'_, T, P> {}

impl<T, P: Policy> FusedIterator for SetIter<'_, T, P> {}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<T, P: Policy, S: Clone> Clone for HashSet<T, P, S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T, P: Policy, S: Default> Default for HashSet<T, P, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, P: Policy, S> fmt::Debug for HashSet<T, P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Hash + Eq, P: Policy, S: BuildHasher> PartialEq for HashSet<T, P, S> {
    fn eq(&self, other: &Self) -> bool {
        if P::ptr_eq::<Node<T, (), P>>(self.tree.root(), other.tree.root()) {
            return true;
        }
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}

impl<T: Hash + Eq, P: Policy, S: BuildHasher> Eq for HashSet<T, P, S> {}

impl<T, P, S> Extend<T> for HashSet<T, P, S>
where
    T: Hash + Eq + Clone,
    P: Policy,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let edit = Edit::new();
        for value in iter {
            self.tree.insert_mut(Some(edit), value, ());
        }
    }
}

impl<T, P, S> FromIterator<T> for HashSet<T, P, S>
where
    T: Hash + Eq + Clone,
    P: Policy,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T, P: Policy, S> IntoIterator for &'a HashSet<T, P, S> {
    type Item = &'a T;
    type IntoIter = SetIter<'a, T, P>;

    fn into_iter(self) -> SetIter<'a, T, P> {
        self.iter()
    }
}
