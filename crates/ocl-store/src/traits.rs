use async_trait::async_trait;
use ocl_types::{Descriptor, Digest, ImageIndex, MediaType};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};

/// An OCI image layout: a content-addressed blob store plus the top-level
/// index.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written. Writing the same bytes twice returns
///   the same digest and stores them once.
/// - `get_blob` verifies that the bytes it returns hash to the requested
///   digest.
/// - `put_index` replaces the whole index atomically; a concurrent reader
///   sees either the old or the new index, never a mix.
/// - Every method honours the [`Context`]: once it is cancelled, calls fail
///   with [`StoreError::Cancelled`](crate::StoreError::Cancelled).
/// - Writes check the context before they start and then run to completion.
///   A write that returns `Cancelled` has not changed the layout; a write
///   that returns `Ok` has.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Read the current top-level index.
    async fn get_index(&self, ctx: &Context) -> StoreResult<ImageIndex>;

    /// Replace the top-level index.
    async fn put_index(&self, ctx: &Context, index: &ImageIndex) -> StoreResult<()>;

    /// Read a blob by digest.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if the
    /// blob does not exist.
    async fn get_blob(&self, ctx: &Context, digest: &Digest) -> StoreResult<Vec<u8>>;

    /// Write a blob and return its SHA-256 digest. Idempotent.
    async fn put_blob(&self, ctx: &Context, data: &[u8]) -> StoreResult<Digest>;

    /// Size of a blob in bytes, or `None` if it does not exist.
    async fn stat_blob(&self, ctx: &Context, digest: &Digest) -> StoreResult<Option<u64>>;

    /// Write a blob and return a descriptor for it.
    async fn put_described(
        &self,
        ctx: &Context,
        media_type: MediaType,
        data: &[u8],
    ) -> StoreResult<Descriptor> {
        let digest = self.put_blob(ctx, data).await?;
        Ok(ocl_types::descriptor(media_type, digest, data.len() as u64)?)
    }
}

/// Check that `data` hashes to `digest`, whatever algorithm it names.
pub(crate) fn verify_blob(digest: &Digest, data: &[u8]) -> StoreResult<()> {
    match ocl_types::digest::verify(digest, data) {
        Ok(true) => Ok(()),
        Ok(false) => Err(StoreError::HashMismatch {
            digest: digest.clone(),
        }),
        Err(_) => Err(StoreError::UnsupportedDigest(digest.clone())),
    }
}
