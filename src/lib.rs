//! Persistent collections on RRB-trees and CHAMP tries.
//!
//! Two engines share one ownership model:
//!
//! - [`rrb`] — relaxed radix-balanced trees: indexed access, push at both
//!   ends, slicing and concatenation with rebalancing.
//! - [`champ`] — compressed hash-array mapped prefix tries: hashed lookup,
//!   insert and remove in **canonical form**, plus a structural diff that
//!   skips shared subtrees.
//!
//! Nodes are reference counted through a [`Policy`] ([`RcPolicy`] or
//! [`ArcPolicy`]). Every operation has a persistent form returning a new
//! handle and a transient `_mut` form editing in place; a node is only ever
//! mutated while its pointer is the single live reference.
//!
//! [`Vector`], [`HashMap`] and [`HashSet`] are thin façades over the engines.
//!
//! # Key properties
//!
//! - **Structural sharing**: O(1) clone, path-copying updates
//! - **Transients**: batched in-place edits with [`Edit`] tokens
//! - **Validation**: `check`, `from_raw_parts` and `from_root` reject
//!   malformed trees with a [`TreeError`]
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # References
//!
//! - Bagwell & Rompf, 2011 — "RRB-Trees: Efficient Immutable Vectors"
//! - Stucki et al., 2015 — "RRB Vector: A Practical General Purpose
//!   Immutable Sequence", ICFP 2015
//! - Steindorfer & Vinju, 2015 — "Optimizing Hash-Array Mapped Tries
//!   for Fast and Lean Immutable JVM Collections", OOPSLA 2015

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod champ;
pub mod error;
pub mod policy;
pub mod rrb;

mod map;
mod set;
mod vector;

#[cfg(test)]
mod tests;

pub use error::{Result, TreeError};
pub use map::{HashMap, HashMapSync, TransientHashMap};
pub use policy::{ArcPolicy, Edit, Policy, RcPolicy};
pub use set::{HashSet, HashSetSync, SetIter, TransientHashSet};
pub use vector::{TransientVector, Vector, VectorSync};
