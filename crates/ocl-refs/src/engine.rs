use ocl_store::{Context, LayoutStore};
use ocl_types::ImageIndex;
use tracing::debug;

use crate::error::{RefError, Result};

/// Reference resolution and index mutation over a [`LayoutStore`].
///
/// The engine holds no index state of its own. Every operation reads the
/// index fresh from the store and mutations write it back exactly once, so
/// an engine can be shared freely. Two engines (or processes) mutating the
/// same layout concurrently get last-writer-wins semantics.
///
/// Operations are split across modules:
/// - [`resolve_reference`](Self::resolve_reference) in `resolve`
/// - [`update_reference`](Self::update_reference),
///   [`add_references`](Self::add_references),
///   [`delete_reference`](Self::delete_reference) and
///   [`list_references`](Self::list_references) in `mutate`
#[derive(Debug)]
pub struct RefEngine<S> {
    pub(crate) store: S,
}

impl<S: LayoutStore> RefEngine<S> {
    /// Create an engine over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the engine and return the store.
    pub fn into_store(self) -> S {
        self.store
    }

    pub(crate) async fn fetch_index(&self, ctx: &Context) -> Result<ImageIndex> {
        self.store.get_index(ctx).await.map_err(RefError::get_index)
    }

    pub(crate) async fn commit_index(&self, ctx: &Context, index: &ImageIndex) -> Result<()> {
        self.store
            .put_index(ctx, index)
            .await
            .map_err(RefError::put_index)?;
        debug!(entries = index.manifests().len(), "committed top-level index");
        Ok(())
    }
}
