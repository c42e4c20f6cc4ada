//! Error types for the matryoshka index.
//!
//! `DUPLICATE` and `NOT_FOUND` are not errors in this crate's vocabulary —
//! they are the ordinary `false`/`None` results of `insert`/`delete`/`search`.
//! `PAGE_FULL` and `UNDERFLOW` never escape the crate; they drive splits and
//! rebalances internally and are never seen by a caller. What's left is the
//! small set of conditions that can actually abort an in-progress mutation.

use thiserror::Error;

/// Result type alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, MtError>;

/// Errors that can escape the public API.
#[derive(Error, Debug)]
pub enum MtError {
    /// The slab or general-purpose allocator could not satisfy a request.
    /// Fatal to the in-progress mutation; the tree is left in the state it
    /// was in before the call that triggered this.
    #[error("allocation failure: {0}")]
    AllocFailure(String),

    /// `bulk_load` was given input that was not strictly ascending, or that
    /// contained a duplicate key.
    #[error("bulk_load input is not strictly sorted at index {index}")]
    BulkLoadNotSorted {
        /// Index of the first offending element.
        index: usize,
    },

    /// An internal consistency check failed. Only produced by the
    /// debug-only introspection API; a correct build never returns this
    /// from ordinary operations.
    #[error("internal invariant violated: {0}")]
    Corruption(String),
}

impl MtError {
    pub fn alloc(msg: impl Into<String>) -> Self {
        Self::AllocFailure(msg.into())
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}
