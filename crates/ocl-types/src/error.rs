use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid digest {digest:?}: {reason}")]
    InvalidDigest { digest: String, reason: String },

    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// An OCI document could not be built.
    #[error("invalid OCI document: {0}")]
    Document(String),
}
