//! Removal operation — copy-on-write path delete with canonical inlining.

use std::borrow::Borrow;

use crate::champ::BITS_PER_LEVEL;
use crate::champ::node::{self, Entry, Node, NodePtr, edit_node, take_single_entry};
use crate::policy::{Edit, Policy};

/// Removes `key` from the subtree rooted at `ptr`, which sits at `shift`.
///
/// The caller checks that the key is present first, so absent keys never
/// copy a path. A child left holding a single entry is inlined into its
/// parent; the node at `ptr` itself is left for its own parent to inline.
pub fn remove_recursive<K, V, P, Q>(
    ptr: &mut NodePtr<K, V, P>,
    hash: u64,
    key: &Q,
    shift: u32,
    edit: Option<Edit>,
) -> Option<Entry<K, V>>
where
    K: Borrow<Q> + Clone,
    V: Clone,
    P: Policy,
    Q: Eq + ?Sized,
{
    match edit_node::<K, V, P>(ptr, edit) {
        Node::Inner {
            data_map,
            node_map,
            entries,
            children,
            ..
        } => {
            let bit = node::mask(node::fragment(hash, shift));

            if *data_map & bit != 0 {
                let pos = node::index(*data_map, bit);
                let found = entries[pos].hash == hash && entries[pos].key.borrow() == key;
                if !found {
                    return None;
                }
                *data_map &= !bit;
                Some(entries.remove(pos))
            } else if *node_map & bit != 0 {
                let pos = node::index(*node_map, bit);
                let removed =
                    remove_recursive::<K, V, P, Q>(&mut children[pos], hash, key, shift + BITS_PER_LEVEL, edit)?;

                // Canonical form: a child with exactly one entry and no
                // children is stored inline in its parent.
                if children[pos].is_single_entry() {
                    let inlined = take_single_entry::<K, V, P>(children.remove(pos));
                    *node_map &= !bit;
                    *data_map |= bit;
                    entries.insert(node::index(*data_map, bit), inlined);
                }
                Some(removed)
            } else {
                None
            }
        }
        Node::Collision { entries, .. } => {
            let pos = entries.iter().position(|e| e.key.borrow() == key)?;
            Some(entries.remove(pos))
        }
    }
}
