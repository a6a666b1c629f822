//! The media types the graph walker understands.
//!
//! Only the core image-spec types are "known". Anything else (artifact
//! types, vendor formats, Docker v2 types, zstd layers) is opaque to the rest
//! of the workspace.

use oci_spec::image::MediaType;

/// Returns `true` for the core image-spec media types.
///
/// The comparison is exact: parameters or different casing make a media
/// type unknown.
pub fn is_known_media_type(media_type: &MediaType) -> bool {
    #[allow(deprecated)]
    let known = matches!(
        media_type,
        MediaType::Descriptor
            | MediaType::ImageManifest
            | MediaType::ImageIndex
            | MediaType::ImageLayer
            | MediaType::ImageLayerGzip
            | MediaType::ImageLayerNonDistributable
            | MediaType::ImageLayerNonDistributableGzip
            | MediaType::ImageConfig
    );
    known
}
