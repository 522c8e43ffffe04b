//! Insertion operation — copy-on-write path insert.
//!
//! Every node on the descent path is made editable with
//! [`edit_node`](crate::champ::node::edit_node): shared nodes are copied, nodes
//! owned solely by the caller are edited in place.

use std::mem;

use crate::champ::BITS_PER_LEVEL;
use crate::champ::node::{self, Entry, Node, NodePtr, create_subtree, edit_node};
use crate::policy::{Edit, Policy};

/// Inserts `entry` into the subtree rooted at `ptr`, which sits at `shift`.
///
/// Returns the value previously stored under the same key, if any.
pub fn insert_recursive<K, V, P>(
    ptr: &mut NodePtr<K, V, P>,
    entry: Entry<K, V>,
    shift: u32,
    edit: Option<Edit>,
) -> Option<V>
where
    K: Eq + Clone,
    V: Clone,
    P: Policy,
{
    match edit_node::<K, V, P>(ptr, edit) {
        Node::Inner {
            data_map,
            node_map,
            entries,
            children,
            ..
        } => {
            let bit = node::mask(node::fragment(entry.hash, shift));

            if *data_map & bit != 0 {
                let pos = node::index(*data_map, bit);
                let existing = &mut entries[pos];
                if existing.hash == entry.hash && existing.key == entry.key {
                    // Same key → replace value.
                    return Some(mem::replace(&mut existing.value, entry.value));
                }
                // Different key at same position → push both into a subtree.
                let existing = entries.remove(pos);
                let subtree = create_subtree::<K, V, P>(existing, entry, shift + BITS_PER_LEVEL);
                *data_map &= !bit;
                *node_map |= bit;
                children.insert(node::index(*node_map, bit), subtree);
                None
            } else if *node_map & bit != 0 {
                // Position has child subtree → recurse.
                let pos = node::index(*node_map, bit);
                insert_recursive::<K, V, P>(&mut children[pos], entry, shift + BITS_PER_LEVEL, edit)
            } else {
                // Position empty → add inline entry.
                *data_map |= bit;
                entries.insert(node::index(*data_map, bit), entry);
                None
            }
        }
        Node::Collision { entries, .. } => {
            if let Some(existing) = entries.iter_mut().find(|e| e.key == entry.key) {
                return Some(mem::replace(&mut existing.value, entry.value));
            }
            entries.push(entry);
            None
        }
    }
}
