//! Crate-level error types.
//!
//! Each seam keeps its own error enum ([`StoreError`], [`MailError`]);
//! this module holds the error surfaced to producers.

use thiserror::Error;

use crate::store::StoreError;

/// Error returned to producer-side callers.
///
/// The consumer side never surfaces these: delivery failures are owned by
/// the dispatcher (retry, then logged drop). Rate-limit denial is not an
/// error either; see [`crate::notify::SendOutcome`].
#[derive(Debug, Error)]
pub enum Error {
    /// Node id outside the 10-bit range. Fatal at startup.
    #[error("node id {0} out of range 0..=1023")]
    InvalidNodeId(i64),

    /// Backing-store operation failed (queue push, counter, credential).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Task could not be serialized for the queue.
    #[error("task encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
