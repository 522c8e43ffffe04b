//! Lookup operation — traverses the trie to find a key.

use std::borrow::Borrow;

use crate::champ::BITS_PER_LEVEL;
use crate::champ::node::{self, Entry, Node, NodePtr};
use crate::policy::Policy;

/// Searches for `key` in the subtree rooted at `node`, which sits at `shift`.
///
/// Returns a reference to the entry if found.
pub fn get_recursive<'a, K, V, P, Q>(
    node: &'a NodePtr<K, V, P>,
    hash: u64,
    key: &Q,
    shift: u32,
) -> Option<&'a Entry<K, V>>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
    P: Policy,
{
    match &**node {
        Node::Inner {
            data_map,
            node_map,
            entries,
            children,
            ..
        } => {
            let bit = node::mask(node::fragment(hash, shift));

            if data_map & bit != 0 {
                // Position has an inline entry.
                let entry = &entries[node::index(*data_map, bit)];
                (entry.hash == hash && entry.key.borrow() == key).then_some(entry)
            } else if node_map & bit != 0 {
                // Position has a child subtree — recurse.
                let child = &children[node::index(*node_map, bit)];
                get_recursive::<K, V, P, Q>(child, hash, key, shift + BITS_PER_LEVEL)
            } else {
                None
            }
        }
        Node::Collision {
            hash: node_hash,
            entries,
            ..
        } => {
            if hash != *node_hash {
                return None;
            }
            entries.iter().find(|entry| entry.key.borrow() == key)
        }
    }
}
