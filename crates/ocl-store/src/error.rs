use std::path::PathBuf;

use ocl_types::{Digest, TypeError};

/// Errors from layout store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(Digest),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {digest}")]
    HashMismatch { digest: Digest },

    /// The blob is addressed with an algorithm this store cannot verify.
    #[error("cannot verify blob {0}: unsupported digest algorithm")]
    UnsupportedDigest(Digest),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory is not a usable OCI image layout.
    #[error("invalid image layout at {path}: {reason}")]
    InvalidLayout { path: PathBuf, reason: String },

    /// Backend failure that is not an I/O error (poisoned lock, lost task).
    #[error("store backend error: {0}")]
    Backend(String),

    /// The operation's context was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Returns `true` if this error only reports cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<TypeError> for StoreError {
    fn from(e: TypeError) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
