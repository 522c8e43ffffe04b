//! CHAMP trie algorithms, one file per operation.

pub mod check;
pub mod diff;
pub mod get;
pub mod insert;
pub mod remove;
