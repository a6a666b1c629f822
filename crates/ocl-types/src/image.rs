use oci_spec::image::{
    Descriptor, ImageIndex, ImageIndexBuilder, ImageManifest, ImageManifestBuilder, MediaType,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TypeError;

/// `schemaVersion` written into every index and manifest.
pub const SCHEMA_VERSION: u32 = 2;

/// An image index over the given entries, in order.
pub fn index(manifests: Vec<Descriptor>) -> Result<ImageIndex, TypeError> {
    ImageIndexBuilder::default()
        .schema_version(SCHEMA_VERSION)
        .media_type(MediaType::ImageIndex)
        .manifests(manifests)
        .build()
        .map_err(|e| TypeError::Document(e.to_string()))
}

/// An image index with no entries, as written by layout creation.
pub fn empty_index() -> Result<ImageIndex, TypeError> {
    index(Vec::new())
}

/// An image manifest for the given config and layers.
pub fn manifest(config: Descriptor, layers: Vec<Descriptor>) -> Result<ImageManifest, TypeError> {
    ImageManifestBuilder::default()
        .schema_version(SCHEMA_VERSION)
        .media_type(MediaType::ImageManifest)
        .config(config)
        .layers(layers)
        .build()
        .map_err(|e| TypeError::Document(e.to_string()))
}

/// Config first, then layers in order.
pub fn children(manifest: &ImageManifest) -> Vec<Descriptor> {
    std::iter::once(manifest.config())
        .chain(manifest.layers().iter())
        .cloned()
        .collect()
}

/// Serialize an OCI document to the JSON form stored on disk.
pub fn to_json<T: Serialize>(document: &T) -> Result<Vec<u8>, TypeError> {
    serde_json::to_vec(document).map_err(|e| TypeError::Serialization(e.to_string()))
}

/// Parse an OCI document from JSON bytes.
pub fn from_json<T: DeserializeOwned>(data: &[u8]) -> Result<T, TypeError> {
    serde_json::from_slice(data).map_err(|e| TypeError::Serialization(e.to_string()))
}
