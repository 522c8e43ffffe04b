//! Iterator types for CHAMP tries.

use std::iter::FusedIterator;
use std::slice;

use super::node::{Entry, NodePtr};
use crate::policy::Policy;

/// Iterator over references to key-value pairs in a [`ChampTree`](super::ChampTree).
///
/// Walks the trie depth-first, yielding a node's inline entries before
/// descending into its children. Holds one slice iterator per level.
pub struct Iter<'a, K, V, P: Policy> {
    entries: slice::Iter<'a, Entry<K, V>>,
    stack: Vec<slice::Iter<'a, NodePtr<K, V, P>>>,
    remaining: usize,
}

impl<'a, K, V, P: Policy> Iter<'a, K, V, P> {
    pub(crate) fn new(root: &'a NodePtr<K, V, P>, len: usize) -> Self {
        Self {
            entries: root.entries().iter(),
            stack: vec![root.children().iter()],
            remaining: len,
        }
    }
}

impl<'a, K, V, P: Policy> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.entries.next() {
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(child) => {
                    self.entries = child.entries().iter();
                    self.stack.push(child.children().iter());
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, P: Policy> ExactSizeIterator for Iter<'_, K, V, P> {}

impl<K, V, P: Policy> FusedIterator for Iter<'_, K, V, P> {}

// Manual impl — avoid false `K: Clone, V: Clone` bounds.

impl<K, V, P: Policy> Clone for Iter<'_, K, V, P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
