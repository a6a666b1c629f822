//! Edits to the top-level index.
//!
//! Every mutation reads the index once, computes the new entry sequence and
//! writes it back once. Entries not tagged with the target name keep their
//! relative order.

use ocl_store::{Context, LayoutStore};
use ocl_types::{Descriptor, DescriptorExt, ImageIndex};
use tracing::debug;

use crate::engine::RefEngine;
use crate::error::Result;
use crate::names::validate_ref_name;
use crate::outcome::{Ambiguity, MutationOutcome};

/// Split off every entry tagged `refname`, returning how many were removed.
fn remove_tagged(index: &mut ImageIndex, refname: &str) -> usize {
    let mut manifests = index.manifests().clone();
    let before = manifests.len();
    manifests.retain(|d| !d.has_ref_name(refname));
    let removed = before - manifests.len();
    index.set_manifests(manifests);
    removed
}

impl<S: LayoutStore> RefEngine<S> {
    /// Point `refname` at `descriptor`, replacing whatever it pointed at.
    ///
    /// All existing entries tagged `refname` are removed and `descriptor`,
    /// tagged with `refname`, is appended. The caller's descriptor is
    /// consumed; only the stored copy carries the annotation.
    pub async fn update_reference(
        &self,
        ctx: &Context,
        refname: &str,
        mut descriptor: Descriptor,
    ) -> Result<MutationOutcome> {
        validate_ref_name(refname)?;
        let mut index = self.fetch_index(ctx).await?;

        let removed = remove_tagged(&mut index, refname);
        descriptor.set_ref_name(refname);
        let mut manifests = index.manifests().clone();
        manifests.push(descriptor);
        index.set_manifests(manifests);

        self.commit_index(ctx, &index).await?;
        debug!(refname, removed, "updated reference");

        let ambiguity = (removed > 1).then_some(Ambiguity::Replaced { count: removed });
        Ok(MutationOutcome::new(refname, removed, 1).with_ambiguity(ambiguity))
    }

    /// Append `descriptors`, each tagged `refname`, without removing
    /// anything.
    ///
    /// Passing no descriptors is a successful no-op that neither validates
    /// `refname` nor touches the store. Adding more than one creates an
    /// ambiguous reference on purpose, which is reported in the outcome.
    pub async fn add_references(
        &self,
        ctx: &Context,
        refname: &str,
        descriptors: Vec<Descriptor>,
    ) -> Result<MutationOutcome> {
        if descriptors.is_empty() {
            return Ok(MutationOutcome::new(refname, 0, 0));
        }
        validate_ref_name(refname)?;

        let mut index = self.fetch_index(ctx).await?;
        let added = descriptors.len();
        let mut manifests = index.manifests().clone();
        manifests.extend(descriptors.into_iter().map(|d| d.with_ref_name(refname)));
        index.set_manifests(manifests);

        self.commit_index(ctx, &index).await?;
        debug!(refname, added, "added references");

        let ambiguity = (added > 1).then_some(Ambiguity::Introduced { count: added });
        Ok(MutationOutcome::new(refname, 0, added).with_ambiguity(ambiguity))
    }

    /// Remove every entry tagged `refname`.
    ///
    /// The index is rewritten even when nothing matched.
    pub async fn delete_reference(&self, ctx: &Context, refname: &str) -> Result<MutationOutcome> {
        validate_ref_name(refname)?;
        let mut index = self.fetch_index(ctx).await?;

        let removed = remove_tagged(&mut index, refname);

        self.commit_index(ctx, &index).await?;
        debug!(refname, removed, "deleted reference");

        let ambiguity = (removed > 1).then_some(Ambiguity::Deleted { count: removed });
        Ok(MutationOutcome::new(refname, removed, 0).with_ambiguity(ambiguity))
    }

    /// Every reference name in the top-level index, in index order.
    ///
    /// Duplicates are kept: a name appearing twice is an ambiguous
    /// reference. Untagged entries are skipped.
    pub async fn list_references(&self, ctx: &Context) -> Result<Vec<String>> {
        let index = self.fetch_index(ctx).await?;
        Ok(index
            .manifests()
            .iter()
            .filter_map(|d| d.ref_name())
            .map(str::to_string)
            .collect())
    }
}
