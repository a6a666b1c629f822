//! Foundation types for OCI image layouts.
//!
//! The document model comes from [`oci_spec::image`] and is re-exported here
//! so that the other `ocl` crates share one version of it. This crate adds
//! the pieces the model does not cover: SHA-256/384/512 verification, the
//! reference-name annotation helpers and the set of media types the graph
//! walker descends into.
//!
//! # Key Types
//!
//! - [`Digest`]: `algorithm:encoded` content address of a blob
//! - [`Descriptor`]: typed, sized pointer to a blob, see [`DescriptorExt`]
//! - [`ImageIndex`]: ordered list of descriptors (the top-level `index.json`)
//! - [`ImageManifest`]: config and layer descriptors of a single image

pub mod descriptor;
pub mod digest;
pub mod error;
pub mod image;
pub mod media_type;

pub use descriptor::{describe, descriptor, DescriptorExt};
pub use error::TypeError;
pub use image::SCHEMA_VERSION;
pub use media_type::is_known_media_type;
pub use oci_spec::image::{
    Descriptor, DescriptorBuilder, Digest, DigestAlgorithm, ImageIndex, ImageIndexBuilder,
    ImageManifest, ImageManifestBuilder, MediaType, ANNOTATION_REF_NAME,
};
