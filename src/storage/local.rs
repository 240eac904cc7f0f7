use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::probe::probe_async;
use super::{ImageUpload, ObjectStore, StoredObject};
use crate::error::StoreError;

/// Object store that keeps blobs in a directory on disk.
///
/// Stored images are served by the gallery server itself at
/// `<public_base>/media/<storage_id>`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    dir: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    /// Create the store, making sure `dir` exists
    pub fn new(dir: impl Into<PathBuf>, public_base: &str) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    /// Get the media directory for blobs when none is configured
    /// Returns ~/.local/share/gallery-wall/media on Linux
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("gallery-wall");
        path.push("media");
        path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a stored blob, if `storage_id` names one.
    /// IDs that could escape the media directory never resolve.
    pub fn blob_path(&self, storage_id: &str) -> Option<PathBuf> {
        if !is_valid_storage_id(storage_id) {
            return None;
        }

        let path = self.dir.join(storage_id);
        path.is_file().then_some(path)
    }

    fn new_storage_id(extension: &str) -> String {
        let suffix: u32 = rand::thread_rng().gen();
        format!(
            "{}-{:08x}.{}",
            Utc::now().timestamp_millis(),
            suffix,
            extension
        )
    }
}

fn is_valid_storage_id(storage_id: &str) -> bool {
    !storage_id.is_empty()
        && !storage_id.starts_with('.')
        && storage_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

impl ObjectStore for LocalObjectStore {
    async fn put(&self, upload: ImageUpload) -> Result<StoredObject, StoreError> {
        let info = probe_async(upload.bytes.clone()).await?;

        let storage_id = Self::new_storage_id(&info.format);
        let path = self.dir.join(&storage_id);
        tokio::fs::write(&path, &upload.bytes).await?;

        debug!(
            "💾 Stored {} ({} bytes) at {}",
            upload.original_name,
            upload.bytes.len(),
            path.display()
        );

        Ok(StoredObject {
            url: format!("{}/media/{}", self.public_base, storage_id),
            storage_id,
            format: info.format,
            width: info.width,
            height: info.height,
        })
    }

    fn local_blob(&self, storage_id: &str) -> Option<PathBuf> {
        self.blob_path(storage_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::probe::tests::encoded_image;
    use image::ImageFormat;

    fn upload(bytes: Vec<u8>) -> ImageUpload {
        ImageUpload {
            bytes: bytes.into(),
            original_name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_writes_blob_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://localhost:3001/").unwrap();
        let bytes = encoded_image(8, 4, ImageFormat::Png);

        let stored = store.put(upload(bytes.clone())).await.unwrap();

        assert_eq!(stored.format, "png");
        assert_eq!((stored.width, stored.height), (8, 4));
        assert!(stored.storage_id.ends_with(".png"));
        assert_eq!(
            stored.url,
            format!("http://localhost:3001/media/{}", stored.storage_id)
        );

        let path = store.blob_path(&stored.storage_id).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_put_rejects_undecodable_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://localhost").unwrap();

        let result = store.put(upload(b"GIF?no".to_vec())).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_blob_path_refuses_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().join("media"), "http://x").unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();

        assert!(store.blob_path("../secret.txt").is_none());
        assert!(store.blob_path("..").is_none());
        assert!(store.blob_path("").is_none());
        assert!(store.blob_path("missing.png").is_none());
    }
}
