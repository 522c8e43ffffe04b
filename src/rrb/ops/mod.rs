//! RRB-tree algorithms, split by concern.
//!
//! Everything here works on raw node pointers plus the `(shift, size)` state
//! needed to interpret them; [`RrbTree`](super::RrbTree) owns the handle-level
//! bookkeeping (size, tail, empty-tree resets).

pub mod check;
pub mod concat;
pub mod get;
pub mod push;
pub mod slice;
pub mod update;
