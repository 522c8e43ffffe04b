//! Element iterator over an [`RrbTree`].

use std::iter::FusedIterator;

use super::DEFAULT_BITS;
use super::tree::RrbTree;
use crate::policy::{Policy, RcPolicy};

/// Borrowing iterator over the elements of an [`RrbTree`], in order.
///
/// Walks one leaf at a time from either end: a root-to-leaf descent happens
/// once per leaf, not once per element.
pub struct Iter<'a, T, P: Policy = RcPolicy, const B: u32 = DEFAULT_BITS> {
    tree: &'a RrbTree<T, P, B>,
    index: usize,
    end: usize,
    leaf: &'a [T],
    leaf_start: usize,
    back: &'a [T],
    back_start: usize,
}

impl<'a, T, P: Policy, const B: u32> Iter<'a, T, P, B> {
    pub(crate) const fn new(tree: &'a RrbTree<T, P, B>) -> Self {
        Self {
            tree,
            index: 0,
            end: tree.len(),
            leaf: &[],
            leaf_start: 0,
            back: &[],
            back_start: 0,
        }
    }
}

impl<'a, T, P: Policy, const B: u32> Iterator for Iter<'a, T, P, B> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.index >= self.end {
            return None;
        }
        if self.index >= self.leaf_start + self.leaf.len() || self.index < self.leaf_start {
            let (leaf, start) = self.tree.leaf_for(self.index);
            self.leaf = leaf;
            self.leaf_start = start;
        }
        let item = &self.leaf[self.index - self.leaf_start];
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.index;
        (len, Some(len))
    }
}

impl<'a, T, P: Policy, const B: u32> DoubleEndedIterator for Iter<'a, T, P, B> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.index >= self.end {
            return None;
        }
        self.end -= 1;
        if self.end >= self.back_start + self.back.len() || self.end < self.back_start {
            let (leaf, start) = self.tree.leaf_for(self.end);
            self.back = leaf;
            self.back_start = start;
        }
        Some(&self.back[self.end - self.back_start])
    }
}

impl<T, P: Policy, const B: u32> ExactSizeIterator for Iter<'_, T, P, B> {}

impl<T, P: Policy, const B: u32> FusedIterator for Iter<'_, T, P, B> {}
