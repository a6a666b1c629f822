//! Descriptor construction and reference-name annotations.

use oci_spec::image::{Descriptor, DescriptorBuilder, Digest, MediaType, ANNOTATION_REF_NAME};

use crate::digest;
use crate::error::TypeError;

/// Build a descriptor with no annotations or optional fields.
pub fn descriptor(media_type: MediaType, digest: Digest, size: u64) -> Result<Descriptor, TypeError> {
    DescriptorBuilder::default()
        .media_type(media_type)
        .digest(digest)
        .size(size)
        .build()
        .map_err(|e| TypeError::Document(e.to_string()))
}

/// Describe `data` as a SHA-256 addressed blob of the given media type.
pub fn describe(media_type: MediaType, data: &[u8]) -> Result<Descriptor, TypeError> {
    descriptor(media_type, digest::sha256(data)?, data.len() as u64)
}

/// Annotation access for [`Descriptor`].
///
/// Setting an annotation keeps every other field of the descriptor,
/// including ones this crate never reads.
pub trait DescriptorExt {
    /// Look up a single annotation.
    fn annotation(&self, key: &str) -> Option<&str>;

    /// Set an annotation, creating the annotations map if needed.
    fn set_annotation(&mut self, key: &str, value: &str);

    /// The reference name this descriptor is tagged with, if any.
    fn ref_name(&self) -> Option<&str> {
        self.annotation(ANNOTATION_REF_NAME)
    }

    /// Returns `true` if this descriptor is tagged with exactly `refname`.
    fn has_ref_name(&self, refname: &str) -> bool {
        self.ref_name() == Some(refname)
    }

    /// Tag this descriptor with a reference name.
    fn set_ref_name(&mut self, refname: &str) {
        self.set_annotation(ANNOTATION_REF_NAME, refname);
    }

    /// Builder-style variant of [`set_ref_name`](Self::set_ref_name).
    fn with_ref_name(mut self, refname: &str) -> Self
    where
        Self: Sized,
    {
        self.set_ref_name(refname);
        self
    }
}

impl DescriptorExt for Descriptor {
    fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations().as_ref()?.get(key).map(String::as_str)
    }

    fn set_annotation(&mut self, key: &str, value: &str) {
        let mut annotations = self.annotations().clone().unwrap_or_default();
        annotations.insert(key.to_string(), value.to_string());
        self.set_annotations(Some(annotations));
    }
}
