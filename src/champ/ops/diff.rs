//! Structural diff between two tries.
//!
//! Subtrees shared by both sides are skipped by pointer identity, so diffing
//! a trie against a recent edit of itself costs time proportional to the edit,
//! not to the size of the trie.

use crate::champ::BITS_PER_LEVEL;
use crate::champ::node::{self, Entry, Node, NodePtr};
use crate::policy::Policy;

/// One difference reported by [`ChampTree::diff`](crate::champ::ChampTree::diff).
#[derive(Debug, PartialEq, Eq)]
pub enum Change<'a, K, V> {
    /// Key present only in the new trie.
    Added(&'a K, &'a V),
    /// Key present only in the old trie.
    Removed(&'a K, &'a V),
    /// Key present in both with unequal values.
    Changed {
        /// The key.
        key: &'a K,
        /// Value in the old trie.
        old: &'a V,
        /// Value in the new trie.
        new: &'a V,
    },
}

// Manual impls — a change is a handful of references.

impl<K, V> Clone for Change<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Change<'_, K, V> {}

/// Reports every difference between the subtrees `old` and `new`, both at
/// `shift`.
pub fn diff_nodes<'a, K, V, P, F>(
    old: &'a NodePtr<K, V, P>,
    new: &'a NodePtr<K, V, P>,
    shift: u32,
    f: &mut F,
) where
    K: Eq + 'a,
    V: PartialEq + 'a,
    P: Policy,
    F: FnMut(Change<'a, K, V>),
{
    if P::ptr_eq::<Node<K, V, P>>(old, new) {
        return;
    }
    match (&**old, &**new) {
        (Node::Inner { .. }, Node::Inner { .. }) => diff_inner::<K, V, P, F>(old, new, shift, f),
        _ => {
            let mut old_entries = Vec::new();
            let mut new_entries = Vec::new();
            collect::<K, V, P>(old, &mut old_entries);
            collect::<K, V, P>(new, &mut new_entries);
            diff_entries(&old_entries, &new_entries, f);
        }
    }
}

fn diff_inner<'a, K, V, P, F>(
    old: &'a NodePtr<K, V, P>,
    new: &'a NodePtr<K, V, P>,
    shift: u32,
    f: &mut F,
) where
    K: Eq + 'a,
    V: PartialEq + 'a,
    P: Policy,
    F: FnMut(Change<'a, K, V>),
{
    let (old_data, old_nodes) = (old.data_map(), old.node_map());
    let (new_data, new_nodes) = (new.data_map(), new.node_map());
    let mut bits = old_data | old_nodes | new_data | new_nodes;

    while bits != 0 {
        let bit = bits & bits.wrapping_neg();
        bits &= !bit;

        let old_entry = (old_data & bit != 0).then(|| &old.entries()[node::index(old_data, bit)]);
        let new_entry = (new_data & bit != 0).then(|| &new.entries()[node::index(new_data, bit)]);
        let old_child = (old_nodes & bit != 0).then(|| &old.children()[node::index(old_nodes, bit)]);
        let new_child = (new_nodes & bit != 0).then(|| &new.children()[node::index(new_nodes, bit)]);

        match (old_entry, old_child, new_entry, new_child) {
            (Some(a), None, Some(b), None) => {
                if a.hash == b.hash && a.key == b.key {
                    if a.value != b.value {
                        f(Change::Changed {
                            key: &a.key,
                            old: &a.value,
                            new: &b.value,
                        });
                    }
                } else {
                    f(Change::Removed(&a.key, &a.value));
                    f(Change::Added(&b.key, &b.value));
                }
            }
            (None, Some(a), None, Some(b)) => {
                diff_nodes::<K, V, P, F>(a, b, shift + BITS_PER_LEVEL, f);
            }
            (Some(a), None, None, Some(b)) => {
                let mut added = Vec::new();
                collect::<K, V, P>(b, &mut added);
                diff_entries(&[a], &added, f);
            }
            (None, Some(a), Some(b), None) => {
                let mut removed = Vec::new();
                collect::<K, V, P>(a, &mut removed);
                diff_entries(&removed, &[b], f);
            }
            (old_entry, old_child, new_entry, new_child) => {
                if let Some(a) = old_entry {
                    f(Change::Removed(&a.key, &a.value));
                }
                if let Some(a) = old_child {
                    for_each_entry::<K, V, P>(a, &mut |e| f(Change::Removed(&e.key, &e.value)));
                }
                if let Some(b) = new_entry {
                    f(Change::Added(&b.key, &b.value));
                }
                if let Some(b) = new_child {
                    for_each_entry::<K, V, P>(b, &mut |e| f(Change::Added(&e.key, &e.value)));
                }
            }
        }
    }
}

/// Diffs two small unordered entry sets by key.
fn diff_entries<'a, K, V, F>(old: &[&'a Entry<K, V>], new: &[&'a Entry<K, V>], f: &mut F)
where
    K: Eq + 'a,
    V: PartialEq + 'a,
    F: FnMut(Change<'a, K, V>),
{
    for a in old {
        match new.iter().find(|b| b.hash == a.hash && b.key == a.key) {
            Some(b) if a.value != b.value => f(Change::Changed {
                key: &a.key,
                old: &a.value,
                new: &b.value,
            }),
            Some(_) => {}
            None => f(Change::Removed(&a.key, &a.value)),
        }
    }
    for b in new {
        if !old.iter().any(|a| a.hash == b.hash && a.key == b.key) {
            f(Change::Added(&b.key, &b.value));
        }
    }
}

fn collect<'a, K: 'a, V: 'a, P: Policy>(ptr: &'a NodePtr<K, V, P>, out: &mut Vec<&'a Entry<K, V>>) {
    for_each_entry::<K, V, P>(ptr, &mut |e| out.push(e));
}

/// Visits every entry below `ptr`, depth-first.
pub fn for_each_entry<'a, K: 'a, V: 'a, P: Policy>(
    ptr: &'a NodePtr<K, V, P>,
    f: &mut dyn FnMut(&'a Entry<K, V>),
) {
    for entry in ptr.entries() {
        f(entry);
    }
    for child in ptr.children() {
        for_each_entry::<K, V, P>(child, f);
    }
}
