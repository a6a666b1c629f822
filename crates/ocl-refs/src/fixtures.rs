//! Graph-building helpers shared by the unit tests.

use ocl_store::InMemoryLayoutStore;
use ocl_types::{describe, image, Descriptor, DescriptorExt, ImageIndex, MediaType};

/// A manifest descriptor whose blob is never written.
pub(crate) fn manifest_entry(seed: &[u8]) -> Descriptor {
    describe(MediaType::ImageManifest, seed).unwrap()
}

/// An index descriptor whose blob is never written.
pub(crate) fn manifest_list_entry(seed: &[u8]) -> Descriptor {
    describe(MediaType::ImageIndex, seed).unwrap()
}

fn put_json<T: serde::Serialize>(
    store: &InMemoryLayoutStore,
    media_type: MediaType,
    value: &T,
) -> Descriptor {
    let data = serde_json::to_vec(value).unwrap();
    store.insert_blob(&data).unwrap();
    describe(media_type, &data).unwrap()
}

/// Store a one-layer image and return its manifest descriptor.
pub(crate) fn put_image(store: &InMemoryLayoutStore, layer: &[u8]) -> Descriptor {
    let config = br#"{"architecture":"amd64","os":"linux"}"#;
    store.insert_blob(config).unwrap();
    store.insert_blob(layer).unwrap();
    let manifest = image::manifest(
        describe(MediaType::ImageConfig, config).unwrap(),
        vec![describe(MediaType::ImageLayerGzip, layer).unwrap()],
    )
    .unwrap();
    put_json(store, MediaType::ImageManifest, &manifest)
}

/// Store an index over `children` and return its descriptor.
pub(crate) fn put_index(store: &InMemoryLayoutStore, children: Vec<Descriptor>) -> Descriptor {
    put_json(store, MediaType::ImageIndex, &image::index(children).unwrap())
}

/// Store `inner` as a descriptor blob and return the wrapping descriptor.
pub(crate) fn put_descriptor(store: &InMemoryLayoutStore, inner: &Descriptor) -> Descriptor {
    put_json(store, MediaType::Descriptor, inner)
}

/// Install `entries` as the top-level index.
pub(crate) fn with_entries(
    store: InMemoryLayoutStore,
    entries: Vec<Descriptor>,
) -> InMemoryLayoutStore {
    store.set_index(image::index(entries).unwrap()).unwrap();
    store
}

/// Reference names of the index entries, in order.
pub(crate) fn ref_names(index: &ImageIndex) -> Vec<Option<String>> {
    index
        .manifests()
        .iter()
        .map(|d| d.ref_name().map(str::to_string))
        .collect()
}
