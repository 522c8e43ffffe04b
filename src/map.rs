//! Persistent hash map façade over the CHAMP engine.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops;

use crate::champ::{Change, ChampTree, DefaultHashBuilder, Iter, Node};
use crate::policy::{ArcPolicy, Edit, Policy, RcPolicy};

/// Persistent hash map based on a CHAMP trie.
///
/// Same set of key-value pairs always produces the same trie structure
/// (canonical form). Modifying methods return a new map sharing every node the
/// edit did not reach.
pub struct HashMap<K, V, P: Policy = RcPolicy, S = DefaultHashBuilder> {
    tree: ChampTree<K, V, P, S>,
}

/// Thread-safe [`HashMap`], `Send + Sync` when `K`, `V` and `S` are.
pub type HashMapSync<K, V, S = DefaultHashBuilder> = HashMap<K, V, ArcPolicy, S>;

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<K, V, P: Policy, S: Default> HashMap<K, V, P, S> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: ChampTree::new(),
        }
    }
}

impl<K, V, P: Policy, S> HashMap<K, V, P, S> {
    /// Creates an empty map hashing keys with `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            tree: ChampTree::with_hasher(hasher),
        }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns an iterator over `(&K, &V)` pairs in trie order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        self.tree.iter()
    }

    /// Returns an iterator over the keys.
    #[must_use]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Returns an iterator over the values.
    #[must_use]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// The underlying trie.
    #[must_use]
    pub const fn tree(&self) -> &ChampTree<K, V, P, S> {
        &self.tree
    }
}

// ---------------------------------------------------------------------------
// Reads — K: Hash + Eq
// ---------------------------------------------------------------------------

impl<K: Hash + Eq, V, P: Policy, S: BuildHasher> HashMap<K, V, P, S> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.get_key_value(key)
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.contains_key(key)
    }
}

impl<K: Eq, V: PartialEq, P: Policy, S> HashMap<K, V, P, S> {
    /// Reports every difference from `self` (old) to `other` (new).
    pub fn diff<'a, F: FnMut(Change<'a, K, V>)>(&'a self, other: &'a Self, f: F) {
        self.tree.diff(&other.tree, f);
    }
}

// ---------------------------------------------------------------------------
// Persistent operations — K: Hash + Eq + Clone, V: Clone
// ---------------------------------------------------------------------------

impl<K, V, P, S> HashMap<K, V, P, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: Policy,
    S: BuildHasher + Clone,
{
    /// Returns a map with `key` mapped to `value`.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        self.tree.insert(key, value).into()
    }

    /// Returns a map with `key` mapped to `f(current value)`.
    #[must_use]
    pub fn update<F: FnOnce(Option<&V>) -> V>(&self, key: K, f: F) -> Self {
        self.tree.update(key, f).into()
    }

    /// Returns a map without `key`.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.remove(key).into()
    }

    /// Starts a transient editing session seeded with this map.
    #[must_use]
    pub fn transient(&self) -> TransientHashMap<K, V, P, S> {
        TransientHashMap {
            tree: self.tree.clone(),
            edit: Edit::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transient
// ---------------------------------------------------------------------------

/// Mutable editing session over a [`HashMap`].
pub struct TransientHashMap<K, V, P: Policy = RcPolicy, S = DefaultHashBuilder> {
    tree: ChampTree<K, V, P, S>,
    edit: Edit,
}

impl<K, V, P: Policy, S> TransientHashMap<K, V, P, S> {
    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the session holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Freezes the session into a persistent map.
    #[must_use]
    pub fn persistent(self) -> HashMap<K, V, P, S> {
        self.tree.into()
    }
}

impl<K: Hash + Eq, V, P: Policy, S: BuildHasher> TransientHashMap<K, V, P, S> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.get(key)
    }
}

impl<K, V, P, S> TransientHashMap<K, V, P, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: Policy,
    S: BuildHasher + Clone,
{
    /// Maps `key` to `value`, returning the displaced value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.tree.insert_mut(Some(self.edit), key, value)
    }

    /// Maps `key` to `f(current value)`, returning the displaced value.
    pub fn update<F: FnOnce(Option<&V>) -> V>(&mut self, key: K, f: F) -> Option<V> {
        self.tree.update_mut(Some(self.edit), key, f)
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.tree.remove_mut(Some(self.edit), key)
    }

    /// Snapshots the current contents as a persistent map.
    #[must_use]
    pub fn checkpoint(&self) -> HashMap<K, V, P, S> {
        self.tree.clone().into()
    }

    /// Restores the contents saved by [`checkpoint`](Self::checkpoint).
    pub fn rollback(&mut self, snapshot: HashMap<K, V, P, S>) {
        self.tree = snapshot.tree;
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P: Policy, S> fmt::Debug for TransientHashMap<K, V, P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransientHashMap")
            .field("edit", &self.edit)
            .field("entries", &self.tree)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, P: Policy, S> From<ChampTree<K, V, P, S>> for HashMap<K, V, P, S> {
    fn from(tree: ChampTree<K, V, P, S>) -> Self {
        Self { tree }
    }
}

impl<K, V, P: Policy, S: Clone> Clone for HashMap<K, V, P, S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K, V, P: Policy, S: Default> Default for HashMap<K, V, P, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, P: Policy, S> fmt::Debug for HashMap<K, V, P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<K, V, P, S> PartialEq for HashMap<K, V, P, S>
where
    K: Hash + Eq,
    V: PartialEq,
    P: Policy,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if P::ptr_eq::<Node<K, V, P>>(self.tree.root(), other.tree.root()) {
            return true;
        }
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Hash + Eq, V: Eq, P: Policy, S: BuildHasher> Eq for HashMap<K, V, P, S> {}

impl<K, V, P, S> Extend<(K, V)> for HashMap<K, V, P, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: Policy,
    S: BuildHasher + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let edit = Edit::new();
        for (key, value) in iter {
            self.tree.insert_mut(Some(edit), key, value);
        }
    }
}

impl<K, V, P, S> FromIterator<(K, V)> for HashMap<K, V, P, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: Policy,
    S: BuildHasher + Clone + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, Q, P, S> ops::Index<&Q> for HashMap<K, V, P, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    P: Policy,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, P: Policy, S> IntoIterator for &'a HashMap<K, V, P, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Iter<'a, K, V, P> {
        self.iter()
    }
}
