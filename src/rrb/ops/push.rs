//! Growth at both ends: grafting a tail leaf onto the right spine and
//! prepending elements along the left spine.

use tracing::trace;

use crate::policy::{Edit, Policy};
use crate::rrb::branches;
use crate::rrb::node::{Node, NodePtr, edit_node, make_path};
use crate::rrb::position::Pos;

/// Largest number of elements a subtree rooted at `shift` can hold.
#[inline]
pub fn capacity<const B: u32>(shift: u32) -> usize {
    1_usize.checked_shl(shift + B).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// push_tail
// ---------------------------------------------------------------------------

/// Returns `true` if a leaf can be appended below `pos` without adding a level.
///
/// A regular node accepts a leaf only while its own leaves are all full;
/// otherwise the new leaf would break the implicit `2^shift` child sizes.
pub fn has_tail_room<T, P: Policy, const B: u32>(pos: Pos<'_, T, P, B>) -> bool {
    match pos {
        Pos::Empty => true,
        Pos::Leaf { .. } => false,
        Pos::Full { .. } => pos.count() < branches(B),
        Pos::Regular { size, .. } if !size.is_multiple_of(branches(B)) => false,
        Pos::Regular { shift, .. } | Pos::Relaxed { shift, .. } => {
            let count = pos.count();
            (shift > B && has_tail_room(pos.child(count - 1))) || count < branches(B)
        }
    }
}

/// Appends `tail` below the inner node at `ptr`, which must have room.
fn push_tail_into<T: Clone, P: Policy, const B: u32>(
    ptr: &mut NodePtr<T, P>,
    shift: u32,
    size: usize,
    tail: NodePtr<T, P>,
    tail_size: usize,
    edit: Option<Edit>,
) {
    let (descend, last, last_size) = {
        let pos = Pos::<T, P, B>::new(ptr, shift, size);
        match pos.count() {
            0 => (false, 0, 0),
            count => (
                shift > B && has_tail_room(pos.child(count - 1)),
                count - 1,
                pos.child_size(count - 1),
            ),
        }
    };

    let (children, sizes) = edit_node::<T, P, B>(ptr, edit).inner_mut();
    if descend {
        push_tail_into::<T, P, B>(&mut children[last], shift - B, last_size, tail, tail_size, edit);
        if let Some(sizes) = sizes {
            sizes[last] += tail_size;
        }
    } else {
        children.push(make_path::<T, P, B>(shift - B, tail));
        if let Some(sizes) = sizes {
            sizes.push(size + tail_size);
        }
    }
}

/// Gives the inner node at `ptr` an explicit size table.
pub fn relax<T: Clone, P: Policy, const B: u32>(
    ptr: &mut NodePtr<T, P>,
    shift: u32,
    size: usize,
    edit: Option<Edit>,
) {
    if ptr.is_relaxed() {
        return;
    }
    let table = Pos::<T, P, B>::new(ptr, shift, size).size_table();
    let (_, sizes) = edit_node::<T, P, B>(ptr, edit).inner_mut();
    *sizes = Some(table);
}

/// Grafts `tail` (holding `tail_size` elements) after the last element of the
/// tree at `root`, which holds `root_size` elements, growing a level if the
/// root has no free slot on its right spine.
pub fn push_tail<T: Clone, P: Policy, const B: u32>(
    root: &mut NodePtr<T, P>,
    shift: &mut u32,
    root_size: usize,
    tail: NodePtr<T, P>,
    tail_size: usize,
    edit: Option<Edit>,
) {
    if root_size == 0 {
        *root = make_path::<T, P, B>(*shift, tail);
        return;
    }
    if has_tail_room(Pos::<T, P, B>::new(root, *shift, root_size)) {
        push_tail_into::<T, P, B>(root, *shift, root_size, tail, tail_size, edit);
        return;
    }

    // A regular root with a partial last leaf has free slots but cannot use
    // them while it stays regular.
    let full = root_size >= capacity::<B>(*shift);
    if !root.is_relaxed() && !full {
        relax::<T, P, B>(root, *shift, root_size, edit);
        if has_tail_room(Pos::<T, P, B>::new(root, *shift, root_size)) {
            push_tail_into::<T, P, B>(root, *shift, root_size, tail, tail_size, edit);
            return;
        }
    }

    let path = make_path::<T, P, B>(*shift, tail);
    let children = vec![root.clone(), path];
    let grown = if root.is_relaxed() {
        Node::<T, P>::relaxed(children, vec![root_size, root_size + tail_size])
    } else {
        Node::<T, P>::inner(children)
    };
    *root = P::alloc(grown);
    *shift += B;
    trace!(shift = *shift, size = root_size + tail_size, "root grew a level");
}

// ---------------------------------------------------------------------------
// push_front
// ---------------------------------------------------------------------------

/// Returns `true` if an element can be prepended below `pos` without adding a
/// level.
pub fn has_front_room<T, P: Policy, const B: u32>(pos: Pos<'_, T, P, B>) -> bool {
    match pos {
        Pos::Empty => true,
        Pos::Leaf { .. } => pos.count() < branches(B),
        _ => has_front_room(pos.child(0)) || pos.count() < branches(B),
    }
}

/// Prepends `value` below the inner node at `ptr`, which must have room.
///
/// Every node on the left spine becomes relaxed.
pub fn push_front_into<T: Clone, P: Policy, const B: u32>(
    ptr: &mut NodePtr<T, P>,
    shift: u32,
    size: usize,
    value: T,
    edit: Option<Edit>,
) {
    let (into_first, first_size, table) = {
        let pos = Pos::<T, P, B>::new(ptr, shift, size);
        (has_front_room(pos.child(0)), pos.child_size(0), pos.size_table())
    };

    let (children, sizes) = edit_node::<T, P, B>(ptr, edit).inner_mut();
    let sizes = sizes.get_or_insert(table);
    if into_first {
        if shift == B {
            edit_node::<T, P, B>(&mut children[0], edit).items_mut().insert(0, value);
        } else {
            push_front_into::<T, P, B>(&mut children[0], shift - B, first_size, value, edit);
        }
    } else {
        let leaf = P::alloc(Node::<T, P>::leaf(vec![value]));
        children.insert(0, make_path::<T, P, B>(shift - B, leaf));
        sizes.insert(0, 0);
    }
    for size in sizes.iter_mut() {
        *size += 1;
    }
}
