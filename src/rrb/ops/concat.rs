//! Concatenation of two trees with bounded rebalancing.
//!
//! The trees are zipped together along the left tree's right spine and the
//! right tree's left spine. At every level the slots meeting at the seam are
//! redistributed by a plan that removes short nodes until the level holds at
//! most `EXTRAS` more nodes than the minimum, keeping lookups logarithmic.

use std::cmp::min;

use tracing::trace;

use crate::policy::Policy;
use crate::rrb::branches;
use crate::rrb::node::{Node, NodePtr};
use crate::rrb::position::Pos;

/// Surplus nodes tolerated per level before redistribution kicks in.
const EXTRAS: usize = 2;

/// Nodes with at least `branches - INVARIANT` slots are left untouched.
const INVARIANT: usize = 1;

/// Joins the trees at `l` and `r`.
///
/// Returns the joined node and its shift. For `top == true` the result is a
/// root; otherwise it is a seam node one level above the inputs, to be
/// rebalanced by the caller.
pub fn concat_sub_tree<T: Clone, P: Policy, const B: u32>(
    l: Pos<'_, T, P, B>,
    r: Pos<'_, T, P, B>,
    top: bool,
) -> (u32, NodePtr<T, P>) {
    let (ls, rs) = (l.shift(), r.shift());
    if ls > rs {
        let (_, seam) = concat_sub_tree(l.child(l.count() - 1), r, false);
        rebalance(Some(l), &seam, None, ls, top)
    } else if ls < rs {
        let (_, seam) = concat_sub_tree(l, r.child(0), false);
        rebalance(None, &seam, Some(r), rs, top)
    } else if ls == 0 {
        let (lc, rc) = (l.count(), r.count());
        let children = [l, r].into_iter().filter_map(Pos::node).cloned().collect();
        (B, P::alloc(Node::<T, P>::relaxed(children, vec![lc, lc + rc])))
    } else {
        let (_, seam) = concat_sub_tree(l.child(l.count() - 1), r.child(0), false);
        rebalance(Some(l), &seam, Some(r), ls, top)
    }
}

/// Computes how many slots each node of a level should hold.
fn plan(mut plan: Vec<usize>, br: usize) -> Vec<usize> {
    let total: usize = plan.iter().sum();
    let optimal = (total - 1) / br + 1;
    let mut i = 0;
    while plan.len() >= optimal + EXTRAS {
        while plan[i] > br - INVARIANT {
            i += 1;
        }
        let mut remaining = plan[i];
        loop {
            let count = min(remaining + plan[i + 1], br);
            remaining = remaining + plan[i + 1] - count;
            plan[i] = count;
            i += 1;
            if remaining == 0 {
                break;
            }
        }
        plan.remove(i);
        i -= 1;
    }
    plan
}

/// Rebalances the children meeting at a seam.
///
/// Gathers the children of `l` (except its last), of `seam` and of `r` (except
/// its first), all at `shift - B`, and repacks them according to [`plan`].
/// `seam` is always relaxed.
fn rebalance<T: Clone, P: Policy, const B: u32>(
    l: Option<Pos<'_, T, P, B>>,
    seam: &NodePtr<T, P>,
    r: Option<Pos<'_, T, P, B>>,
    shift: u32,
    top: bool,
) -> (u32, NodePtr<T, P>) {
    let seam = Pos::<T, P, B>::new(seam, shift, 0);
    let mut slots = Vec::new();
    if let Some(l) = l {
        slots.extend((0..l.count() - 1).map(|offset| l.child(offset)));
    }
    slots.extend((0..seam.count()).map(|offset| seam.child(offset)));
    if let Some(r) = r {
        slots.extend((1..r.count()).map(|offset| r.child(offset)));
    }

    let plan = plan(slots.iter().map(|pos| pos.count()).collect(), branches(B));
    trace!(shift, before = slots.len(), after = plan.len(), "concat rebalance");

    let mut merger = Merger::<T, P, B>::new(plan);
    for pos in slots {
        merger.merge(pos);
    }
    merger.finish(shift, top)
}

// ---------------------------------------------------------------------------
// Merger
// ---------------------------------------------------------------------------

/// Node being filled slot by slot.
enum Building<T, P: Policy> {
    Leaf(Vec<T>),
    Inner {
        children: Vec<NodePtr<T, P>>,
        sizes: Vec<usize>,
    },
}

impl<T, P: Policy> Building<T, P> {
    const fn count(&self) -> usize {
        match self {
            Self::Leaf(items) => items.len(),
            Self::Inner { children, .. } => children.len(),
        }
    }

    fn into_node(self) -> (NodePtr<T, P>, usize) {
        match self {
            Self::Leaf(items) => {
                let size = items.len();
                (P::alloc(Node::<T, P>::leaf(items)), size)
            }
            Self::Inner { children, sizes } => {
                let size = sizes.last().copied().unwrap_or(0);
                (P::alloc(Node::<T, P>::relaxed(children, sizes)), size)
            }
        }
    }
}

/// Repacks a level's nodes into new parents, following a plan.
///
/// A node whose slot count already matches its planned count is shared as-is.
struct Merger<T, P: Policy, const B: u32> {
    plan: Vec<usize>,
    cursor: usize,
    building: Option<Building<T, P>>,
    parent: Vec<NodePtr<T, P>>,
    parent_sizes: Vec<usize>,
    /// First parent, once the level overflowed into a second one.
    full: Option<(NodePtr<T, P>, usize)>,
}

impl<T: Clone, P: Policy, const B: u32> Merger<T, P, B> {
    const fn new(plan: Vec<usize>) -> Self {
        Self {
            plan,
            cursor: 0,
            building: None,
            parent: Vec::new(),
            parent_sizes: Vec::new(),
            full: None,
        }
    }

    fn merge(&mut self, pos: Pos<'_, T, P, B>) {
        let Some(node) = pos.node() else {
            return;
        };
        let count = pos.count();
        if self.building.is_none() && self.plan[self.cursor] == count {
            self.add_child(node.clone(), pos.size());
            self.cursor += 1;
            return;
        }

        let mut from = 0;
        while from < count {
            let target = self.plan[self.cursor];
            let building = self.building.get_or_insert_with(|| {
                if pos.shift() == 0 {
                    Building::Leaf(Vec::with_capacity(target))
                } else {
                    Building::Inner {
                        children: Vec::with_capacity(target),
                        sizes: Vec::with_capacity(target),
                    }
                }
            });
            let take = min(target - building.count(), count - from);
            match building {
                Building::Leaf(items) => items.extend_from_slice(&pos.items()[from..from + take]),
                Building::Inner { children, sizes } => {
                    for offset in from..from + take {
                        let before = sizes.last().copied().unwrap_or(0);
                        children.push(pos.children()[offset].clone());
                        sizes.push(before + pos.child_size(offset));
                    }
                }
            }
            from += take;
            if building.count() == target {
                if let Some(done) = self.building.take() {
                    let (node, size) = done.into_node();
                    self.add_child(node, size);
                }
                self.cursor += 1;
            }
        }
    }

    fn add_child(&mut self, node: NodePtr<T, P>, size: usize) {
        if self.parent.len() == branches(B) {
            let total = self.parent_sizes.last().copied().unwrap_or(0);
            let sizes = std::mem::take(&mut self.parent_sizes);
            let children = std::mem::take(&mut self.parent);
            self.full = Some((P::alloc(Node::<T, P>::relaxed(children, sizes)), total));
        }
        let before = self.parent_sizes.last().copied().unwrap_or(0);
        self.parent.push(node);
        self.parent_sizes.push(before + size);
    }

    fn finish(self, shift: u32, top: bool) -> (u32, NodePtr<T, P>) {
        let size = self.parent_sizes.last().copied().unwrap_or(0);
        let parent = P::alloc(Node::<T, P>::relaxed(self.parent, self.parent_sizes));
        match self.full {
            Some((full, full_size)) => (
                shift + B,
                P::alloc(Node::<T, P>::relaxed(vec![full, parent], vec![full_size, full_size + size])),
            ),
            None if top => (shift, parent),
            None => (shift + B, P::alloc(Node::<T, P>::relaxed(vec![parent], vec![size]))),
        }
    }
}
