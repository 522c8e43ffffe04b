//! Structural and hash validation of CHAMP tries.

use std::hash::{BuildHasher, Hash};

use crate::champ::node::{self, Node, NodePtr};
use crate::champ::{BITS_PER_LEVEL, MAX_SHIFT};
use crate::error::{Result, TreeError};
use crate::policy::Policy;

/// Verifies the subtree at `ptr`, which sits at `shift` and whose entries all
/// share the low `shift` bits `prefix`. Returns the number of entries.
///
/// Hashes are recomputed with `hasher`; a stored hash that disagrees is
/// reported as [`TreeError::HashMismatch`], every other violation as
/// [`TreeError::InvalidTree`].
pub fn check_node<K, V, P, S>(
    ptr: &NodePtr<K, V, P>,
    shift: u32,
    prefix: u64,
    is_root: bool,
    hasher: &S,
) -> Result<usize>
where
    K: Hash + Eq,
    P: Policy,
    S: BuildHasher,
{
    match &**ptr {
        Node::Inner {
            data_map,
            node_map,
            entries,
            children,
            ..
        } => {
            if shift > MAX_SHIFT {
                return Err(TreeError::invalid(format!("inner node at shift {shift}")));
            }
            if data_map & node_map != 0 {
                return Err(TreeError::invalid(format!(
                    "bitmaps overlap at shift {shift}: {data_map:#034b} & {node_map:#034b}"
                )));
            }
            if entries.len() != data_map.count_ones() as usize
                || children.len() != node_map.count_ones() as usize
            {
                return Err(TreeError::invalid(format!(
                    "bitmaps disagree with {} entries and {} children at shift {shift}",
                    entries.len(),
                    children.len()
                )));
            }
            if !is_root && entries.len() + children.len() == 0 {
                return Err(TreeError::invalid(format!("empty inner node at shift {shift}")));
            }
            if !is_root && entries.len() == 1 && children.is_empty() {
                return Err(TreeError::invalid(format!(
                    "single-entry node at shift {shift} is not inlined"
                )));
            }

            let low = low_bits(shift);
            let mut bits = *data_map;
            for entry in entries {
                check_hash(entry.hash, &entry.key, hasher)?;
                let bit = bits & bits.wrapping_neg();
                bits &= !bit;
                if entry.hash & low != prefix || node::mask(node::fragment(entry.hash, shift)) != bit {
                    return Err(TreeError::invalid(format!(
                        "entry hash {:#018x} stored off its path at shift {shift}",
                        entry.hash
                    )));
                }
            }

            let mut total = entries.len();
            let mut bits = *node_map;
            for child in children {
                let bit = bits & bits.wrapping_neg();
                bits &= !bit;
                let frag = u64::from(bit.trailing_zeros());
                let child_prefix = prefix | (frag << shift);
                total += check_node::<K, V, P, S>(
                    child,
                    shift + BITS_PER_LEVEL,
                    child_prefix,
                    false,
                    hasher,
                )?;
            }
            Ok(total)
        }
        Node::Collision { hash, entries, .. } => {
            if shift <= MAX_SHIFT || is_root {
                return Err(TreeError::invalid(format!("collision node at shift {shift}")));
            }
            if entries.len() < 2 {
                return Err(TreeError::invalid(format!(
                    "collision node with {} entries",
                    entries.len()
                )));
            }
            if *hash != prefix {
                return Err(TreeError::invalid(format!(
                    "collision node for {hash:#018x} stored under {prefix:#018x}"
                )));
            }
            for (i, entry) in entries.iter().enumerate() {
                check_hash(entry.hash, &entry.key, hasher)?;
                if entry.hash != *hash {
                    return Err(TreeError::HashMismatch {
                        stored: *hash,
                        computed: entry.hash,
                    });
                }
                if entries[..i].iter().any(|other| other.key == entry.key) {
                    return Err(TreeError::invalid("duplicate key in collision node"));
                }
            }
            Ok(entries.len())
        }
    }
}

/// Mask of the hash bits consumed above `shift`.
const fn low_bits(shift: u32) -> u64 {
    if shift >= u64::BITS {
        u64::MAX
    } else {
        (1 << shift) - 1
    }
}

fn check_hash<K: Hash, S: BuildHasher>(stored: u64, key: &K, hasher: &S) -> Result<()> {
    let computed = hasher.hash_one(key);
    if computed == stored {
        Ok(())
    } else {
        tracing::debug!(stored, computed, "stored hash disagrees with key");
        Err(TreeError::HashMismatch { stored, computed })
    }
}
