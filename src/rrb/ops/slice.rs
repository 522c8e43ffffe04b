//! Slicing: keeping a prefix (`take`) or dropping a prefix (`skip`).
//!
//! Both run in two phases. The first is read-only: it finds the leaf holding
//! the cut and, when that leaf cannot be edited in place, copies the part of
//! it that survives. The second cuts the tree structurally and never calls
//! element code, so a panicking `Clone` leaves the tree untouched.

use crate::policy::{Edit, Policy, can_mutate};
use crate::rrb::node::{Node, NodePtr, edit_node};
use crate::rrb::position::Pos;

/// Finds the leaf holding `index`.
///
/// Returns the leaf, the index's offset inside it, and whether every node on
/// the path from `root` down to the leaf may be edited in place.
fn locate<'a, T: 'a, P: Policy, const B: u32>(
    root: &'a NodePtr<T, P>,
    shift: u32,
    size: usize,
    index: usize,
) -> (&'a NodePtr<T, P>, usize, bool) {
    let mut pos = Pos::<T, P, B>::new(root, shift, size);
    let mut index = index;
    let mut unique = can_mutate::<P, Node<T, P>>(root);
    loop {
        if let Pos::Leaf { node } = pos {
            return (node, index, unique);
        }
        let offset = pos.index(index);
        index -= pos.size_before(offset);
        pos = pos.child(offset);
        if let Some(node) = pos.node() {
            unique &= can_mutate::<P, Node<T, P>>(node);
        }
    }
}

// ---------------------------------------------------------------------------
// take
// ---------------------------------------------------------------------------

/// Removes everything after element `last` below `ptr`, plus the leaf holding
/// `last` itself, which is returned. `tail_len` elements of that leaf are
/// destined for the new tail.
fn cut_right<T: Clone, P: Policy, const B: u32>(
    ptr: &mut NodePtr<T, P>,
    shift: u32,
    size: usize,
    last: usize,
    tail_len: usize,
    edit: Option<Edit>,
) -> NodePtr<T, P> {
    let (offset, before, child_size) = {
        let pos = Pos::<T, P, B>::new(ptr, shift, size);
        let offset = pos.index(last);
        (offset, pos.size_before(offset), pos.child_size(offset))
    };

    let (children, sizes) = edit_node::<T, P, B>(ptr, edit).inner_mut();
    children.truncate(offset + 1);
    if let Some(sizes) = sizes.as_mut() {
        sizes.truncate(offset + 1);
    }

    if shift == B {
        if let Some(sizes) = sizes.as_mut() {
            sizes.truncate(offset);
        }
        return children.remove(offset);
    }

    let leaf = cut_right::<T, P, B>(
        &mut children[offset],
        shift - B,
        child_size,
        last - before,
        tail_len,
        edit,
    );
    let child_kept = last - before + 1 - tail_len;
    if child_kept == 0 {
        children.truncate(offset);
        if let Some(sizes) = sizes.as_mut() {
            sizes.truncate(offset);
        }
    } else if let Some(sizes) = sizes.as_mut() {
        sizes[offset] = before + child_kept;
    }
    leaf
}

/// Keeps the first `n` of the `root_size` elements below `root` and returns
/// the leaf that becomes the new tail. Requires `0 < n <= root_size`.
pub fn take_root<T: Clone, P: Policy, const B: u32>(
    root: &mut NodePtr<T, P>,
    shift: &mut u32,
    root_size: usize,
    n: usize,
    edit: Option<Edit>,
) -> NodePtr<T, P> {
    let last = n - 1;
    let (leaf, offset, unique) = locate::<T, P, B>(root, *shift, root_size, last);
    let tail_len = offset + 1;
    let copied = (tail_len < leaf.count() && !unique)
        .then(|| P::alloc(Node::<T, P>::leaf(leaf.items()[..tail_len].to_vec())));

    let mut popped = cut_right::<T, P, B>(root, *shift, root_size, last, tail_len, edit);

    if root.count() == 0 {
        *root = P::alloc(Node::<T, P>::inner(Vec::new()));
        *shift = B;
    } else {
        while *shift > B && root.count() == 1 {
            let child = root.children()[0].clone();
            *root = child;
            *shift -= B;
        }
    }

    copied.unwrap_or_else(|| {
        if tail_len < popped.count() {
            edit_node::<T, P, B>(&mut popped, edit).items_mut().truncate(tail_len);
        }
        popped
    })
}

// ---------------------------------------------------------------------------
// skip
// ---------------------------------------------------------------------------

/// Removes the first `first` elements below `ptr`. The leaf holding element
/// `first` is swapped for `replacement` when one was prepared.
fn cut_left<T: Clone, P: Policy, const B: u32>(
    ptr: &mut NodePtr<T, P>,
    shift: u32,
    size: usize,
    first: usize,
    replacement: Option<NodePtr<T, P>>,
    edit: Option<Edit>,
) {
    let (offset, before, child_size, table) = {
        let pos = Pos::<T, P, B>::new(ptr, shift, size);
        let offset = pos.index(first);
        (
            offset,
            pos.size_before(offset),
            pos.child_size(offset),
            pos.size_table(),
        )
    };

    let (children, sizes) = edit_node::<T, P, B>(ptr, edit).inner_mut();
    let sizes = sizes.get_or_insert(table);
    children.drain(..offset);
    sizes.drain(..offset);
    for size in sizes.iter_mut() {
        *size -= first;
    }

    let child_first = first - before;
    if child_first == 0 {
        return;
    }
    if shift == B {
        match replacement {
            Some(leaf) => children[0] = leaf,
            None => {
                edit_node::<T, P, B>(&mut children[0], edit)
                    .items_mut()
                    .drain(..child_first);
            }
        }
    } else {
        cut_left::<T, P, B>(&mut children[0], shift - B, child_size, child_first, replacement, edit);
    }
}

/// Drops the first `first` of the `root_size` elements below `root`. Requires
/// `0 < first < root_size`.
pub fn skip_root<T: Clone, P: Policy, const B: u32>(
    root: &mut NodePtr<T, P>,
    shift: &mut u32,
    root_size: usize,
    first: usize,
    edit: Option<Edit>,
) {
    let (leaf, offset, unique) = locate::<T, P, B>(root, *shift, root_size, first);
    let copied =
        (offset > 0 && !unique).then(|| P::alloc(Node::<T, P>::leaf(leaf.items()[offset..].to_vec())));

    let mut size = root_size;
    let mut first = first;
    while *shift > B {
        let (offset, before, count) = {
            let pos = Pos::<T, P, B>::new(root, *shift, size);
            let offset = pos.index(first);
            (offset, pos.size_before(offset), pos.count())
        };
        if offset + 1 != count {
            break;
        }
        let child = root.children()[offset].clone();
        *root = child;
        *shift -= B;
        size -= before;
        first -= before;
    }

    cut_left::<T, P, B>(root, *shift, size, first, copied, edit);
}
