//! In-place element updates along a single root-to-leaf path.

use crate::policy::{Edit, Policy};
use crate::rrb::node::{NodePtr, edit_node};
use crate::rrb::position::Pos;

/// Applies `f` to the element at `index` below `ptr`, copying every shared
/// node on the path first.
pub fn update_in<T: Clone, P: Policy, const B: u32, F: FnOnce(&mut T)>(
    ptr: &mut NodePtr<T, P>,
    shift: u32,
    size: usize,
    index: usize,
    f: F,
    edit: Option<Edit>,
) {
    if shift == 0 {
        f(&mut edit_node::<T, P, B>(ptr, edit).items_mut()[index]);
        return;
    }
    let (offset, before, child_size) = {
        let pos = Pos::<T, P, B>::new(ptr, shift, size);
        let offset = pos.index(index);
        (offset, pos.size_before(offset), pos.child_size(offset))
    };
    let (children, _) = edit_node::<T, P, B>(ptr, edit).inner_mut();
    update_in::<T, P, B, F>(&mut children[offset], shift - B, child_size, index - before, f, edit);
}
