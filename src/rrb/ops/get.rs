//! Read-only descents: element lookup, leaf lookup and chunked traversal.

use crate::policy::Policy;
use crate::rrb::position::{Pos, Visitor};

/// Descends to the element at a subtree-relative index.
pub struct Lookup {
    pub index: usize,
}

impl Lookup {
    fn descend<'a, T: 'a, P: Policy, const B: u32>(&mut self, pos: Pos<'a, T, P, B>) -> &'a T {
        let offset = pos.index(self.index);
        self.index -= pos.size_before(offset);
        pos.child(offset).visit(self)
    }
}

impl<'a, T: 'a, P: Policy, const B: u32> Visitor<'a, T, P, B> for Lookup {
    type Output = &'a T;

    fn on_relaxed(&mut self, pos: Pos<'a, T, P, B>) -> &'a T {
        self.descend(pos)
    }

    fn on_inner(&mut self, pos: Pos<'a, T, P, B>) -> &'a T {
        self.descend(pos)
    }

    fn on_leaf(&mut self, pos: Pos<'a, T, P, B>) -> &'a T {
        &pos.items()[self.index]
    }
}

/// Descends to the leaf holding an index; yields the leaf's elements and the
/// index of its first element.
pub struct LeafLookup {
    pub index: usize,
    pub base: usize,
}

impl LeafLookup {
    fn descend<'a, T: 'a, P: Policy, const B: u32>(
        &mut self,
        pos: Pos<'a, T, P, B>,
    ) -> (&'a [T], usize) {
        let offset = pos.index(self.index);
        let before = pos.size_before(offset);
        self.index -= before;
        self.base += before;
        pos.child(offset).visit(self)
    }
}

impl<'a, T: 'a, P: Policy, const B: u32> Visitor<'a, T, P, B> for LeafLookup {
    type Output = (&'a [T], usize);

    fn on_relaxed(&mut self, pos: Pos<'a, T, P, B>) -> Self::Output {
        self.descend(pos)
    }

    fn on_inner(&mut self, pos: Pos<'a, T, P, B>) -> Self::Output {
        self.descend(pos)
    }

    fn on_leaf(&mut self, pos: Pos<'a, T, P, B>) -> Self::Output {
        (pos.items(), self.base)
    }
}

/// Feeds every leaf, left to right, to a callback.
pub struct Chunks<F> {
    pub f: F,
}

impl<F> Chunks<F> {
    fn each_child<'a, T: 'a, P: Policy, const B: u32>(&mut self, pos: Pos<'a, T, P, B>)
    where
        F: FnMut(&'a [T]),
    {
        for offset in 0..pos.count() {
            pos.child(offset).visit(self);
        }
    }
}

impl<'a, T: 'a, P: Policy, const B: u32, F: FnMut(&'a [T])> Visitor<'a, T, P, B> for Chunks<F> {
    type Output = ();

    fn on_relaxed(&mut self, pos: Pos<'a, T, P, B>) {
        self.each_child(pos);
    }

    fn on_inner(&mut self, pos: Pos<'a, T, P, B>) {
        self.each_child(pos);
    }

    fn on_leaf(&mut self, pos: Pos<'a, T, P, B>) {
        (self.f)(pos.items());
    }
}
