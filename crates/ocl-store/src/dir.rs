//! OCI image layout on disk.
//!
//! ```text
//! <root>/
//! ├── oci-layout            # {"imageLayoutVersion": "1.0.0"}
//! ├── index.json            # top-level ImageIndex
//! └── blobs/
//!     └── sha256/<hex>      # content-addressed blobs
//! ```
//!
//! Blob and index writes go to a temporary file in the destination directory
//! which is then renamed into place, so readers never observe a partially
//! written file. Reads race against cancellation. Writes only check it
//! before they start; once the temporary file exists the write finishes, so
//! the returned result always describes what is on disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use ocl_types::{digest, image, Digest, ImageIndex};

use crate::context::Context;
use crate::error::{StoreError, StoreResult};
use crate::traits::{verify_blob, LayoutStore};

/// Name of the layout marker file.
pub const LAYOUT_FILE: &str = "oci-layout";
/// Name of the top-level index file.
pub const INDEX_FILE: &str = "index.json";
/// Name of the blob directory.
pub const BLOBS_DIR: &str = "blobs";
/// The only layout version this store reads and writes.
pub const IMAGE_LAYOUT_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutMarker {
    image_layout_version: String,
}

/// A [`LayoutStore`] backed by an OCI image layout directory.
#[derive(Clone, Debug)]
pub struct DirLayoutStore {
    root: PathBuf,
}

impl DirLayoutStore {
    /// Initialize a new, empty layout at `root`.
    ///
    /// The directory is created if needed. Fails with
    /// [`StoreError::InvalidLayout`] if it already contains a layout.
    pub async fn create(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        if fs::try_exists(root.join(LAYOUT_FILE)).await? {
            return Err(StoreError::InvalidLayout {
                path: root,
                reason: "an image layout already exists here".into(),
            });
        }

        let store = Self { root };
        fs::create_dir_all(store.root.join(BLOBS_DIR).join("sha256")).await?;

        let marker = serde_json::to_vec(&LayoutMarker {
            image_layout_version: IMAGE_LAYOUT_VERSION.into(),
        })
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
        atomic_write(store.root.clone(), LAYOUT_FILE, marker).await?;
        let index = image::to_json(&image::empty_index()?)?;
        atomic_write(store.root.clone(), INDEX_FILE, index).await?;

        debug!(root = %store.root.display(), "created image layout");
        Ok(store)
    }

    /// Open an existing layout, validating its `oci-layout` marker.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        let marker_path = root.join(LAYOUT_FILE);
        let data = match fs::read(&marker_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::InvalidLayout {
                    path: root,
                    reason: format!("missing {LAYOUT_FILE} file"),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let marker: LayoutMarker =
            serde_json::from_slice(&data).map_err(|e| StoreError::InvalidLayout {
                path: root.clone(),
                reason: format!("malformed {LAYOUT_FILE}: {e}"),
            })?;
        if marker.image_layout_version != IMAGE_LAYOUT_VERSION {
            return Err(StoreError::InvalidLayout {
                path: root,
                reason: format!(
                    "unsupported imageLayoutVersion {:?}",
                    marker.image_layout_version
                ),
            });
        }

        Ok(Self { root })
    }

    /// Root directory of the layout.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the blob with the given digest.
    pub fn blob_path(&self, digest: &Digest) -> PathBuf {
        self.blob_dir(digest).join(digest.digest())
    }

    fn blob_dir(&self, digest: &Digest) -> PathBuf {
        self.root.join(BLOBS_DIR).join(digest.algorithm().to_string())
    }
}

#[async_trait]
impl LayoutStore for DirLayoutStore {
    async fn get_index(&self, ctx: &Context) -> StoreResult<ImageIndex> {
        let path = self.root.join(INDEX_FILE);
        ctx.run(async {
            let data = fs::read(&path).await?;
            Ok::<_, StoreError>(image::from_json::<ImageIndex>(&data)?)
        })
        .await
    }

    async fn put_index(&self, ctx: &Context, index: &ImageIndex) -> StoreResult<()> {
        ctx.check()?;
        let data = image::to_json(index)?;
        atomic_write(self.root.clone(), INDEX_FILE, data).await?;
        debug!(entries = index.manifests().len(), "replaced index.json");
        Ok(())
    }

    async fn get_blob(&self, ctx: &Context, digest: &Digest) -> StoreResult<Vec<u8>> {
        let path = self.blob_path(digest);
        ctx.run(async {
            let data = match fs::read(&path).await {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(StoreError::NotFound(digest.clone()));
                }
                Err(e) => return Err(e.into()),
            };
            verify_blob(digest, &data)?;
            Ok(data)
        })
        .await
    }

    async fn put_blob(&self, ctx: &Context, data: &[u8]) -> StoreResult<Digest> {
        ctx.check()?;
        let digest = digest::sha256(data)?;
        let path = self.blob_path(&digest);
        if fs::try_exists(&path).await? {
            return Ok(digest);
        }
        let dir = self.blob_dir(&digest);
        fs::create_dir_all(&dir).await?;
        atomic_write(dir, digest.digest(), data.to_vec()).await?;
        Ok(digest)
    }

    async fn stat_blob(&self, ctx: &Context, digest: &Digest) -> StoreResult<Option<u64>> {
        let path = self.blob_path(digest);
        ctx.run(async {
            match fs::metadata(&path).await {
                Ok(meta) => Ok(Some(meta.len())),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(StoreError::Io(e)),
            }
        })
        .await
    }
}

/// Write `data` to `dir/name` via a temporary file and rename.
async fn atomic_write(dir: PathBuf, name: &str, data: Vec<u8>) -> StoreResult<()> {
    let target = dir.join(name);
    tokio::task::spawn_blocking(move || -> StoreResult<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| StoreError::Backend(format!("write task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocl_types::{describe, Descriptor, DescriptorExt, MediaType};

    fn manifest_entries(count: usize) -> Vec<Descriptor> {
        (0..count)
            .map(|i| {
                describe(MediaType::ImageManifest, format!("manifest {i}").as_bytes())
                    .unwrap()
                    .with_ref_name(&format!("tag-{i}"))
            })
            .collect()
    }

    #[tokio::test]
    async fn create_writes_layout_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLayoutStore::create(dir.path()).await.unwrap();

        let marker = std::fs::read_to_string(dir.path().join(LAYOUT_FILE)).unwrap();
        assert!(marker.contains("\"imageLayoutVersion\":\"1.0.0\""));
        assert!(dir.path().join(BLOBS_DIR).join("sha256").is_dir());

        let index = store.get_index(&Context::new()).await.unwrap();
        assert!(index.manifests().is_empty());
        assert_eq!(index.schema_version(), 2);
    }

    #[tokio::test]
    async fn create_refuses_existing_layout() {
        let dir = tempfile::tempdir().unwrap();
        DirLayoutStore::create(dir.path()).await.unwrap();
        let err = DirLayoutStore::create(dir.path()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidLayout { .. }));
    }

    #[tokio::test]
    async fn open_requires_marker() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirLayoutStore::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidLayout { .. }));

        std::fs::write(
            dir.path().join(LAYOUT_FILE),
            r#"{"imageLayoutVersion":"2.0.0"}"#,
        )
        .unwrap();
        let err = DirLayoutStore::open(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("unsupported imageLayoutVersion"));
    }

    #[tokio::test]
    async fn index_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        DirLayoutStore::create(dir.path()).await.unwrap();
        let store = DirLayoutStore::open(dir.path()).await.unwrap();
        let ctx = Context::new();

        let entry = describe(MediaType::ImageManifest, b"m").unwrap().with_ref_name("v1");
        let index = image::index(vec![entry.clone(), entry]).unwrap();
        store.put_index(&ctx, &index).await.unwrap();

        assert_eq!(store.get_index(&ctx).await.unwrap(), index);
    }

    #[tokio::test]
    async fn index_rewrite_keeps_fields_it_does_not_use() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLayoutStore::create(dir.path()).await.unwrap();
        let ctx = Context::new();

        let subject = describe(MediaType::ImageManifest, b"subject").unwrap();
        let written = serde_json::json!({
            "schemaVersion": 2,
            "mediaType": "application/vnd.oci.image.index.v1+json",
            "artifactType": "application/vnd.example.bundle",
            "manifests": [{
                "mediaType": "application/vnd.oci.image.manifest.v1+json",
                "digest": describe(MediaType::ImageManifest, b"m").unwrap().digest().to_string(),
                "size": 1,
                "urls": ["https://mirror.example/m"],
                "platform": { "architecture": "amd64", "os": "linux" },
                "artifactType": "application/vnd.example.sbom+json",
                "data": "bQ==",
                "annotations": { "org.opencontainers.image.ref.name": "v1" }
            }],
            "subject": subject,
            "annotations": { "org.opencontainers.image.created": "2024-01-01" }
        });
        std::fs::write(dir.path().join(INDEX_FILE), written.to_string()).unwrap();

        let index = store.get_index(&ctx).await.unwrap();
        store.put_index(&ctx, &index).await.unwrap();

        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join(INDEX_FILE)).unwrap()).unwrap();
        assert_eq!(on_disk, written);
    }

    #[tokio::test]
    async fn blobs_live_under_algorithm_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLayoutStore::create(dir.path()).await.unwrap();
        let ctx = Context::new();

        let digest = store.put_blob(&ctx, b"layer bytes").await.unwrap();
        let path = dir.path().join("blobs/sha256").join(digest.digest());
        assert_eq!(std::fs::read(path).unwrap(), b"layer bytes");
        assert_eq!(store.get_blob(&ctx, &digest).await.unwrap(), b"layer bytes");
        assert_eq!(store.stat_blob(&ctx, &digest).await.unwrap(), Some(11));

        // Second write of the same content is a no-op.
        assert_eq!(store.put_blob(&ctx, b"layer bytes").await.unwrap(), digest);
    }

    #[tokio::test]
    async fn sha512_blob_is_read_and_verified() {
        use sha2::{Digest as _, Sha512};

        let dir = tempfile::tempdir().unwrap();
        let store = DirLayoutStore::create(dir.path()).await.unwrap();
        let ctx = Context::new();

        let encoded = hex::encode(Sha512::digest(b"config"));
        let digest = digest::parse(&format!("sha512:{encoded}")).unwrap();
        let blob_dir = dir.path().join("blobs/sha512");
        std::fs::create_dir_all(&blob_dir).unwrap();
        std::fs::write(blob_dir.join(&encoded), b"config").unwrap();

        assert_eq!(store.blob_path(&digest), blob_dir.join(&encoded));
        assert_eq!(store.stat_blob(&ctx, &digest).await.unwrap(), Some(6));
        assert_eq!(store.get_blob(&ctx, &digest).await.unwrap(), b"config");
    }

    #[tokio::test]
    async fn missing_and_corrupt_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLayoutStore::create(dir.path()).await.unwrap();
        let ctx = Context::new();

        let missing = digest::sha256(b"nope").unwrap();
        assert!(matches!(
            store.get_blob(&ctx, &missing).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert_eq!(store.stat_blob(&ctx, &missing).await.unwrap(), None);

        let digest = store.put_blob(&ctx, b"good").await.unwrap();
        std::fs::write(store.blob_path(&digest), b"evil").unwrap();
        assert!(matches!(
            store.get_blob(&ctx, &digest).await.unwrap_err(),
            StoreError::HashMismatch { .. }
        ));
    }

    #[tokio::test]
    async fn cancelled_context_leaves_index_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLayoutStore::create(dir.path()).await.unwrap();
        let ctx = Context::new();
        ctx.cancel();

        let err = store
            .put_index(&ctx, &image::index(manifest_entries(1)).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let err = store.put_blob(&ctx, b"blob").await.unwrap_err();
        assert!(err.is_cancelled());

        let index = store.get_index(&Context::new()).await.unwrap();
        assert!(index.manifests().is_empty());
        assert!(!store.blob_path(&digest::sha256(b"blob").unwrap()).exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn index_write_result_matches_disk_under_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirLayoutStore::create(dir.path()).await.unwrap();
        let index = image::index(manifest_entries(2000)).unwrap();

        for delay_us in [0u64, 50, 200, 1000] {
            store
                .put_index(&Context::new(), &image::empty_index().unwrap())
                .await
                .unwrap();

            let ctx = Context::new();
            let write = {
                let store = store.clone();
                let ctx = ctx.clone();
                let index = index.clone();
                tokio::spawn(async move { store.put_index(&ctx, &index).await })
            };
            tokio::time::sleep(std::time::Duration::from_micros(delay_us)).await;
            ctx.cancel();
            let result = write.await.unwrap();

            let on_disk = store.get_index(&Context::new()).await.unwrap();
            match result {
                Ok(()) => assert_eq!(on_disk, index, "delay {delay_us}us"),
                Err(e) => {
                    assert!(e.is_cancelled(), "delay {delay_us}us: {e}");
                    assert!(on_disk.manifests().is_empty(), "delay {delay_us}us");
                }
            }
        }
    }
}
