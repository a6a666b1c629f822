use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use ocl_types::{digest, Digest, ImageIndex};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::traits::{verify_blob, LayoutStore};

/// In-memory, HashMap-based layout store.
///
/// Intended for tests and embedding. The index and blobs are held behind
/// `RwLock`s and cloned on read/write. Blobs are keyed by the canonical
/// `algorithm:encoded` string. Index reads and writes are counted so tests
/// can assert how often the index was touched.
pub struct InMemoryLayoutStore {
    index: RwLock<ImageIndex>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    index_reads: AtomicUsize,
    index_writes: AtomicUsize,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(format!("lock poisoned: {e}"))
}

impl InMemoryLayoutStore {
    /// Create a store with an empty index and no blobs.
    pub fn new() -> Self {
        Self::with_index(ImageIndex::default())
    }

    /// Create a store whose index starts out as `index`.
    pub fn with_index(index: ImageIndex) -> Self {
        Self {
            index: RwLock::new(index),
            blobs: RwLock::new(HashMap::new()),
            index_reads: AtomicUsize::new(0),
            index_writes: AtomicUsize::new(0),
        }
    }

    /// Store a blob under its SHA-256 digest without a context. Test and
    /// setup helper.
    pub fn insert_blob(&self, data: &[u8]) -> StoreResult<Digest> {
        let digest = digest::sha256(data)?;
        self.blobs
            .write()
            .map_err(poisoned)?
            .entry(digest.to_string())
            .or_insert_with(|| data.to_vec());
        Ok(digest)
    }

    /// Store bytes under an arbitrary digest without hashing them. Used to
    /// seed blobs addressed with other algorithms, or to simulate
    /// corruption.
    pub fn corrupt_blob(&self, digest: &Digest, data: Vec<u8>) -> StoreResult<()> {
        self.blobs
            .write()
            .map_err(poisoned)?
            .insert(digest.to_string(), data);
        Ok(())
    }

    /// Replace the index without a context or counting it as a write.
    /// Test and setup helper.
    pub fn set_index(&self, index: ImageIndex) -> StoreResult<()> {
        *self.index.write().map_err(poisoned)? = index;
        Ok(())
    }

    /// Snapshot of the current index, without counting it as a read.
    pub fn snapshot(&self) -> StoreResult<ImageIndex> {
        let index = self.index.read().map_err(poisoned)?;
        Ok(index.clone())
    }

    /// Number of blobs currently stored.
    pub fn blob_count(&self) -> StoreResult<usize> {
        Ok(self.blobs.read().map_err(poisoned)?.len())
    }

    /// How many times `get_index` has been called.
    pub fn index_reads(&self) -> usize {
        self.index_reads.load(Ordering::SeqCst)
    }

    /// How many times `put_index` has been called.
    pub fn index_writes(&self) -> usize {
        self.index_writes.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryLayoutStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LayoutStore for InMemoryLayoutStore {
    async fn get_index(&self, ctx: &Context) -> StoreResult<ImageIndex> {
        ctx.check()?;
        self.index_reads.fetch_add(1, Ordering::SeqCst);
        self.snapshot()
    }

    async fn put_index(&self, ctx: &Context, index: &ImageIndex) -> StoreResult<()> {
        ctx.check()?;
        self.index_writes.fetch_add(1, Ordering::SeqCst);
        *self.index.write().map_err(poisoned)? = index.clone();
        Ok(())
    }

    async fn get_blob(&self, ctx: &Context, digest: &Digest) -> StoreResult<Vec<u8>> {
        ctx.check()?;
        let blobs = self.blobs.read().map_err(poisoned)?;
        let data = blobs
            .get(&digest.to_string())
            .ok_or_else(|| StoreError::NotFound(digest.clone()))?;
        verify_blob(digest, data)?;
        Ok(data.clone())
    }

    async fn put_blob(&self, ctx: &Context, data: &[u8]) -> StoreResult<Digest> {
        ctx.check()?;
        self.insert_blob(data)
    }

    async fn stat_blob(&self, ctx: &Context, digest: &Digest) -> StoreResult<Option<u64>> {
        ctx.check()?;
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.get(&digest.to_string()).map(|data| data.len() as u64))
    }
}

impl std::fmt::Debug for InMemoryLayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("InMemoryLayoutStore");
        match self.blob_count() {
            Ok(count) => s.field("blob_count", &count),
            Err(_) => s.field("blob_count", &"<poisoned>"),
        };
        s.field("index_reads", &self.index_reads())
            .field("index_writes", &self.index_writes())
            .finish()
    }
}
