//! The CHAMP trie handle: persistent operations and their transient `_mut`
//! counterparts.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ptr;

use super::iter::Iter;
use super::node::{Entry, Node, NodePtr};
use super::ops::check::check_node;
use super::ops::diff::{Change, diff_nodes, for_each_entry};
use super::ops::get::get_recursive;
use super::ops::insert::insert_recursive;
use super::ops::remove::remove_recursive;
use super::DefaultHashBuilder;
use crate::error::{Result, TreeError};
use crate::policy::{Edit, Policy, RcPolicy};

/// Persistent hash trie (CHAMP).
///
/// Same set of key-value pairs always produces the same trie structure
/// (canonical form). Cloning is O(1) and shares every node; persistent
/// operations take `&self` and return a new handle, `_mut` operations edit the
/// handle in place, copying only nodes that another handle can observe.
pub struct ChampTree<K, V, P: Policy = RcPolicy, S = DefaultHashBuilder> {
    root: NodePtr<K, V, P>,
    size: usize,
    hasher: S,
}

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<K, V, P: Policy, S> ChampTree<K, V, P, S> {
    /// Creates an empty trie hashing keys with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            root: P::alloc(Node::<K, V, P>::empty()),
            size: 0,
            hasher,
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the trie contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Root node.
    #[must_use]
    pub const fn root(&self) -> &NodePtr<K, V, P> {
        &self.root
    }

    /// The trie's hash builder.
    #[must_use]
    pub const fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns an iterator over `(&K, &V)` pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter::new(&self.root, self.size)
    }

    /// Calls `f` with every node's inline entries.
    ///
    /// Each slice is a contiguous run of entries, suited to bulk copies.
    pub fn for_each_chunk<'a, F: FnMut(&'a [Entry<K, V>])>(&'a self, mut f: F) {
        fn walk<'a, K, V, P: Policy>(
            ptr: &'a NodePtr<K, V, P>,
            f: &mut dyn FnMut(&'a [Entry<K, V>]),
        ) {
            if !ptr.entries().is_empty() {
                f(ptr.entries());
            }
            for child in ptr.children() {
                walk::<K, V, P>(child, f);
            }
        }
        walk::<K, V, P>(&self.root, &mut f);
    }
}

impl<K, V, P: Policy, S: Default> ChampTree<K, V, P, S> {
    /// Creates an empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

// ---------------------------------------------------------------------------
// Lookup & validation — require K: Hash + Eq, S: BuildHasher
// ---------------------------------------------------------------------------

impl<K, V, P, S> ChampTree<K, V, P, S>
where
    K: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    /// Rehydrates a trie from its root node, validating every invariant and
    /// every stored hash against `hasher`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::HashMismatch`] if `hasher` disagrees with a stored
    /// hash, [`TreeError::InvalidTree`] for any structural violation.
    pub fn from_root(root: NodePtr<K, V, P>, hasher: S) -> Result<Self> {
        let size = check_node::<K, V, P, S>(&root, 0, 0, true, &hasher)?;
        let tree = Self { root, size, hasher };
        tree.check_lookups()?;
        Ok(tree)
    }

    /// Returns a reference to the value for `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).map(|entry| &entry.value)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).map(|entry| (&entry.key, &entry.value))
    }

    /// Returns `true` if the trie contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_entry(key).is_some()
    }

    fn get_entry<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        get_recursive::<K, V, P, Q>(&self.root, hash, key, 0)
    }

    /// Verifies every structural invariant and recomputes every stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::HashMismatch`] if a stored hash disagrees with the
    /// hasher or a lookup does not land on its entry, and
    /// [`TreeError::InvalidTree`] for any structural violation.
    pub fn check(&self) -> Result<()> {
        let counted = check_node::<K, V, P, S>(&self.root, 0, 0, true, &self.hasher)?;
        if counted != self.size {
            return Err(TreeError::invalid(format!(
                "size {} disagrees with {counted} stored entries",
                self.size
            )));
        }
        self.check_lookups()
    }

    /// Looks every entry up by its key and checks the lookup lands on it.
    fn check_lookups(&self) -> Result<()> {
        let mut failure = None;
        for_each_entry::<K, V, P>(&self.root, &mut |entry| {
            if failure.is_some() {
                return;
            }
            let found = self.get_entry(&entry.key);
            if !found.is_some_and(|found| ptr::eq(found, entry)) {
                failure = Some(TreeError::HashMismatch {
                    stored: entry.hash,
                    computed: self.hasher.hash_one(&entry.key),
                });
            }
        });
        failure.map_or(Ok(()), Err)
    }

    /// Runs [`check`](Self::check) after a mutation when the `deep-check`
    /// feature is on.
    #[inline]
    fn debug_check(&self, op: &'static str) {
        if cfg!(feature = "deep-check")
            && let Err(err) = self.check()
        {
            tracing::error!(op, %err, "trie invariant broken");
        }
    }
}

impl<K, V, P, S> ChampTree<K, V, P, S>
where
    K: Eq,
    V: PartialEq,
    P: Policy,
{
    /// Reports every difference from `self` (old) to `other` (new).
    ///
    /// Subtrees shared by both tries are skipped without being visited.
    pub fn diff<'a, F>(&'a self, other: &'a Self, mut f: F)
    where
        F: FnMut(Change<'a, K, V>),
    {
        diff_nodes::<K, V, P, F>(&self.root, &other.root, 0, &mut f);
    }
}

// ---------------------------------------------------------------------------
// Operations — require K: Hash + Eq + Clone, V: Clone
// ---------------------------------------------------------------------------

impl<K, V, P, S> ChampTree<K, V, P, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: Policy,
    S: BuildHasher + Clone,
{
    // -- persistent ---------------------------------------------------------

    /// Returns a trie with `key` mapped to `value`.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let mut tree = self.clone();
        tree.insert_mut(None, key, value);
        tree
    }

    /// Returns a trie with `key` mapped to `f(current value)`.
    #[must_use]
    pub fn update<F: FnOnce(Option<&V>) -> V>(&self, key: K, f: F) -> Self {
        let mut tree = self.clone();
        tree.update_mut(None, key, f);
        tree
    }

    /// Returns a trie without `key`.
    ///
    /// Returns a handle sharing the same root if `key` is absent.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut tree = self.clone();
        tree.remove_mut(None, key);
        tree
    }

    // -- transient ----------------------------------------------------------

    /// Maps `key` to `value` in place, returning the displaced value.
    pub fn insert_mut(&mut self, edit: Option<Edit>, key: K, value: V) -> Option<V> {
        let hash = self.hasher.hash_one(&key);
        let entry = Entry { hash, key, value };
        let old = insert_recursive::<K, V, P>(&mut self.root, entry, 0, edit);
        if old.is_none() {
            self.size += 1;
        }
        self.debug_check("insert");
        old
    }

    /// Maps `key` to `f(current value)` in place, returning the displaced
    /// value.
    ///
    /// `f` runs before any node is copied, so a panic in it changes nothing.
    pub fn update_mut<F: FnOnce(Option<&V>) -> V>(&mut self, edit: Option<Edit>, key: K, f: F) -> Option<V> {
        let value = f(self.get(&key));
        self.insert_mut(edit, key, value)
    }

    /// Removes `key` in place, returning its value.
    pub fn remove_mut<Q>(&mut self, edit: Option<Edit>, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.contains_key(key) {
            return None;
        }
        let hash = self.hasher.hash_one(key);
        let removed = remove_recursive::<K, V, P, Q>(&mut self.root, hash, key, 0, edit)?;
        self.size -= 1;
        self.debug_check("remove");
        Some(removed.value)
    }
}

// ---------------------------------------------------------------------------
// Manual trait impls — avoid false `K: Clone, V: Clone, P: Clone` bounds.
// ---------------------------------------------------------------------------

impl<K, V, P: Policy, S: Clone> Clone for ChampTree<K, V, P, S> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            size: self.size,
            hasher: self.hasher.clone(),
        }
    }
}

impl<K, V, P: Policy, S: Default> Default for ChampTree<K, V, P, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P: Policy, S> fmt::Debug for ChampTree<K, V, P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, P: Policy, S> IntoIterator for &'a ChampTree<K, V, P, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
