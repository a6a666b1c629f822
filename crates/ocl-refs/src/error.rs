//! Error types for reference operations.

use std::convert::Infallible;

use ocl_store::{StoreError, WalkError};
use ocl_types::Digest;
use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The empty string is not a reference name.
    #[error("reference name must not be empty")]
    EmptyRefName,

    /// The reference name does not follow the `ref.name` grammar.
    #[error("invalid reference name: {name}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// Reading the top-level index failed.
    #[error("get top-level index: {0}")]
    GetIndex(StoreError),

    /// Committing the new top-level index failed.
    #[error("replace index: {0}")]
    PutIndex(StoreError),

    /// Walking the graph below a matching root failed.
    #[error("walk {digest}: {cause}")]
    Walk {
        digest: Digest,
        cause: WalkError<Infallible>,
    },

    /// The operation's context was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl RefError {
    /// Returns `true` if the operation stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub(crate) fn get_index(e: StoreError) -> Self {
        if e.is_cancelled() {
            Self::Cancelled
        } else {
            Self::GetIndex(e)
        }
    }

    pub(crate) fn put_index(e: StoreError) -> Self {
        if e.is_cancelled() {
            Self::Cancelled
        } else {
            Self::PutIndex(e)
        }
    }

    pub(crate) fn walk(digest: Digest, cause: WalkError<Infallible>) -> Self {
        if cause.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Walk { digest, cause }
        }
    }
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
