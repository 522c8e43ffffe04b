//! Error types reported by raw construction and validation.

use thiserror::Error;

/// Failure surfaced by tree validation, raw node construction or fallible
/// allocation.
///
/// Ordinary persistent and transient operations are total over valid trees and
/// never return this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A structural invariant does not hold (bad shift, size table mismatch,
    /// bitmap/array disagreement, leaf at the wrong depth, ...).
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// An entry's stored hash disagrees with the hash recomputed from its key,
    /// or a lookup by that hash does not land on the entry.
    ///
    /// Indicates a hash function mismatch between whoever built the tree and
    /// whoever is reading it.
    #[error("hash mismatch: entry stored under {stored:#018x}, key hashes to {computed:#018x}")]
    HashMismatch {
        /// Hash recorded in the tree.
        stored: u64,
        /// Hash computed from the key with the current hasher.
        computed: u64,
    },

    /// Reserving storage for a node failed.
    #[error("out of memory: failed to reserve {requested} slots")]
    OutOfMemory {
        /// Number of slots that could not be reserved.
        requested: usize,
    },
}

impl TreeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        let err = Self::InvalidTree(msg.into());
        tracing::debug!(%err, "tree rejected");
        err
    }
}

/// Result alias used by validation and raw construction.
pub type Result<T, E = TreeError> = std::result::Result<T, E>;
