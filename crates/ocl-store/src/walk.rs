//! Generic Merkle graph walk over an image layout.
//!
//! [`walk`] explores the graph below a root descriptor depth-first, calling a
//! visitor for every descriptor it reaches. The visitor decides, per node,
//! whether the walk descends into that node's children
//! ([`WalkSignal::Continue`]) or skips them ([`WalkSignal::Prune`]). Sibling
//! branches are unaffected by a prune.
//!
//! Children are discovered from the blob of the visited descriptor:
//!
//! | media type   | children                          |
//! |--------------|-----------------------------------|
//! | image index  | `manifests`, in order             |
//! | manifest     | `config`, then `layers` in order  |
//! | descriptor   | the descriptor stored in the blob |
//! | anything else| none (the blob is never read)     |
//!
//! Each digest is visited at most once per walk.

use std::collections::HashSet;

use ocl_types::{image, Descriptor, Digest, ImageIndex, ImageManifest, MediaType};
use tracing::trace;

use crate::context::Context;
use crate::error::StoreError;
use crate::traits::LayoutStore;

/// What the walker should do after visiting a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkSignal {
    /// Descend into this descriptor's children.
    Continue,
    /// Do not descend below this descriptor; keep walking its siblings.
    Prune,
}

/// Errors that abort a walk.
#[derive(Debug, thiserror::Error)]
pub enum WalkError<E> {
    /// Reading a blob failed.
    #[error("read blob: {0}")]
    Store(StoreError),

    /// A blob could not be parsed as the document its media type promises.
    #[error("decode {digest}: {reason}")]
    Decode { digest: Digest, reason: String },

    /// The visitor returned an error.
    #[error("visit: {0}")]
    Visit(E),

    /// The walk's context was cancelled.
    #[error("walk cancelled")]
    Cancelled,
}

impl<E> WalkError<E> {
    /// Returns `true` if the walk stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl<E> From<StoreError> for WalkError<E> {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Cancelled => Self::Cancelled,
            other => Self::Store(other),
        }
    }
}

/// Walk the graph rooted at `root`, visiting every reachable descriptor
/// (including `root`) in depth-first pre-order.
///
/// Cancellation is checked before every visit.
pub async fn walk<S, F, E>(
    ctx: &Context,
    store: &S,
    root: &Descriptor,
    mut visit: F,
) -> Result<(), WalkError<E>>
where
    S: LayoutStore + ?Sized,
    F: FnMut(&Descriptor) -> Result<WalkSignal, E>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut stack: Vec<Descriptor> = vec![root.clone()];

    while let Some(descriptor) = stack.pop() {
        ctx.check()?;
        if !seen.insert(descriptor.digest().to_string()) {
            continue;
        }

        let signal = visit(&descriptor).map_err(WalkError::Visit)?;
        trace!(digest = %descriptor.digest(), media_type = %descriptor.media_type(), ?signal, "visited");
        if signal == WalkSignal::Prune {
            continue;
        }

        let children = children(ctx, store, &descriptor).await?;
        // Reverse so the first child is popped first.
        stack.extend(children.into_iter().rev());
    }

    Ok(())
}

/// Direct children of `descriptor`, in document order.
async fn children<S, E>(
    ctx: &Context,
    store: &S,
    descriptor: &Descriptor,
) -> Result<Vec<Descriptor>, WalkError<E>>
where
    S: LayoutStore + ?Sized,
{
    let decode = |reason: String| WalkError::Decode {
        digest: descriptor.digest().clone(),
        reason,
    };

    match descriptor.media_type() {
        MediaType::ImageIndex => {
            let data = store.get_blob(ctx, descriptor.digest()).await?;
            let index: ImageIndex = image::from_json(&data).map_err(|e| decode(e.to_string()))?;
            Ok(index.manifests().clone())
        }
        MediaType::ImageManifest => {
            let data = store.get_blob(ctx, descriptor.digest()).await?;
            let manifest: ImageManifest =
                image::from_json(&data).map_err(|e| decode(e.to_string()))?;
            Ok(image::children(&manifest))
        }
        MediaType::Descriptor => {
            let data = store.get_blob(ctx, descriptor.digest()).await?;
            let inner: Descriptor = image::from_json(&data).map_err(|e| decode(e.to_string()))?;
            Ok(vec![inner])
        }
        _ => Ok(Vec::new()),
    }
}
