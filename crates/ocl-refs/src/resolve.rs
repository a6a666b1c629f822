use std::convert::Infallible;

use ocl_store::{walk, Context, LayoutStore, WalkSignal};
use ocl_types::{is_known_media_type, Descriptor, DescriptorExt, MediaType};
use tracing::debug;

use crate::engine::RefEngine;
use crate::error::{RefError, Result};
use crate::names::validate_ref_name;

impl<S: LayoutStore> RefEngine<S> {
    /// Resolve `refname` to every manifest (or unknown blob) reachable from
    /// the top-level index entries tagged with it.
    ///
    /// Only top-level entries are matched. From each match the graph is
    /// walked transparently through indexes and descriptor blobs; the walk
    /// stops at the first image manifest or unrecognized media type on each
    /// path and records that descriptor.
    ///
    /// The result may be empty (nothing tagged `refname`) or hold several
    /// descriptors (ambiguous tag, or an index pointing at several
    /// manifests). Choosing between them is up to the caller. Results from
    /// different matching entries are concatenated in index order without
    /// deduplication.
    pub async fn resolve_reference(&self, ctx: &Context, refname: &str) -> Result<Vec<Descriptor>> {
        validate_ref_name(refname)?;
        let index = self.fetch_index(ctx).await?;

        // Reference annotations deeper in the graph are not references.
        let roots = index.manifests().iter().filter(|d| d.has_ref_name(refname));

        let mut resolutions = Vec::new();
        for root in roots {
            walk::<_, _, Infallible>(ctx, &self.store, root, |descriptor| {
                Ok(resolution_signal(descriptor, &mut resolutions))
            })
            .await
            .map_err(|cause| RefError::walk(root.digest().clone(), cause))?;
        }

        debug!(refname, resolved = resolutions.len(), "resolved reference");
        Ok(resolutions)
    }
}

/// Pass through known non-manifest types; record and stop at everything else.
fn resolution_signal(descriptor: &Descriptor, resolutions: &mut Vec<Descriptor>) -> WalkSignal {
    let media_type = descriptor.media_type();
    if is_known_media_type(media_type) && *media_type != MediaType::ImageManifest {
        return WalkSignal::Continue;
    }
    resolutions.push(descriptor.clone());
    WalkSignal::Prune
}
