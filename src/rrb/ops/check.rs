//! Structural validation of RRB trees.

use crate::error::{Result, TreeError};
use crate::policy::Policy;
use crate::rrb::branches;
use crate::rrb::node::{Node, NodePtr};

/// Verifies every structural invariant of the tree `{size, shift, root, tail}`.
pub fn check_tree<T, P: Policy, const B: u32>(
    size: usize,
    shift: u32,
    root: &NodePtr<T, P>,
    tail: &NodePtr<T, P>,
) -> Result<()> {
    if shift < B || !shift.is_multiple_of(B) {
        return Err(TreeError::invalid(format!(
            "root shift {shift} is not a positive multiple of {B}"
        )));
    }
    if !tail.is_leaf() {
        return Err(TreeError::invalid("tail is not a leaf"));
    }
    let tail_len = tail.count();
    if tail_len > branches(B) {
        return Err(TreeError::invalid(format!("tail holds {tail_len} elements")));
    }
    if root.is_leaf() {
        return Err(TreeError::invalid("root is a leaf"));
    }
    if size == 0 {
        if tail_len != 0 || root.count() != 0 {
            return Err(TreeError::invalid("empty tree with non-empty nodes"));
        }
        return Ok(());
    }
    if tail_len == 0 {
        return Err(TreeError::invalid("non-empty tree with an empty tail"));
    }

    let root_size = if root.count() == 0 { 0 } else { check_node::<T, P, B>(root, shift)? };
    if root_size + tail_len != size {
        return Err(TreeError::invalid(format!(
            "size {size} disagrees with contents {root_size} + tail {tail_len}"
        )));
    }
    if !root.is_relaxed() && !root_size.is_multiple_of(branches(B)) {
        return Err(TreeError::invalid(format!(
            "regular root over {root_size} elements ends in a partial leaf"
        )));
    }
    Ok(())
}

/// Verifies the subtree at `node` and returns its element count.
fn check_node<T, P: Policy, const B: u32>(node: &Node<T, P>, shift: u32) -> Result<usize> {
    match node {
        Node::Leaf { items, .. } => {
            if shift != 0 {
                return Err(TreeError::invalid(format!("leaf at shift {shift}")));
            }
            if items.is_empty() || items.len() > branches(B) {
                return Err(TreeError::invalid(format!("leaf holds {} elements", items.len())));
            }
            Ok(items.len())
        }
        Node::Inner { children, sizes, .. } => {
            if shift == 0 {
                return Err(TreeError::invalid("inner node at shift 0"));
            }
            if children.is_empty() || children.len() > branches(B) {
                return Err(TreeError::invalid(format!(
                    "inner node at shift {shift} has {} children",
                    children.len()
                )));
            }
            sizes.as_deref().map_or_else(
                || check_regular::<T, P, B>(children, shift),
                |sizes| check_relaxed::<T, P, B>(children, sizes, shift),
            )
        }
    }
}

fn check_relaxed<T, P: Policy, const B: u32>(
    children: &[NodePtr<T, P>],
    sizes: &[usize],
    shift: u32,
) -> Result<usize> {
    if sizes.len() != children.len() {
        return Err(TreeError::invalid(format!(
            "size table has {} entries for {} children",
            sizes.len(),
            children.len()
        )));
    }
    let mut total = 0;
    for (child, &cumulative) in children.iter().zip(sizes) {
        let child_size = check_node::<T, P, B>(child, shift - B)?;
        if child_size > 1 << shift {
            return Err(TreeError::invalid(format!(
                "child of {child_size} elements under shift {shift}"
            )));
        }
        total += child_size;
        if cumulative != total {
            return Err(TreeError::invalid(format!(
                "size table entry {cumulative}, subtrees sum to {total}"
            )));
        }
    }
    Ok(total)
}

fn check_regular<T, P: Policy, const B: u32>(children: &[NodePtr<T, P>], shift: u32) -> Result<usize> {
    let mut total = 0;
    let last = children.len() - 1;
    for (offset, child) in children.iter().enumerate() {
        if child.is_relaxed() {
            return Err(TreeError::invalid("relaxed child below a regular node"));
        }
        let child_size = check_node::<T, P, B>(child, shift - B)?;
        if offset < last && child_size != 1 << shift {
            return Err(TreeError::invalid(format!(
                "regular node at shift {shift}: child {offset} holds {child_size} elements"
            )));
        }
        total += child_size;
    }
    Ok(total)
}
