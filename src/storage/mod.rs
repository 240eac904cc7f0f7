/// Object storage module
///
/// Uploaded image bytes never live in the catalog. They are handed to an
/// object store, which returns a stable public URL and an identifier:
/// - Probing format and dimensions of an upload (probe.rs)
/// - A disk-backed store served by this process under /media (local.rs)
/// - A hosted image CDN reached over its signed upload API (cloud.rs)

pub mod cloud;
pub mod local;
pub mod probe;

pub use cloud::{CloudCredentials, CloudObjectStore};
pub use local::LocalObjectStore;

use bytes::Bytes;
use std::future::Future;
use std::path::PathBuf;

use crate::error::StoreError;

/// One image file as received from the browser
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub original_name: String,
    /// Declared media type, e.g. "image/png"
    pub content_type: String,
}

impl ImageUpload {
    /// Only the declared media type is checked; the object store does the real decoding.
    pub fn is_image(&self) -> bool {
        self.content_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

/// What the object store tells us about a stored image
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub url: String,
    pub storage_id: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
}

/// A durable blob service for images.
///
/// One call is one upload; implementations do not retry.
pub trait ObjectStore: Send + Sync + 'static {
    fn put(
        &self,
        upload: ImageUpload,
    ) -> impl Future<Output = Result<StoredObject, StoreError>> + Send;

    /// Disk location of a blob this process serves itself, if any
    fn local_blob(&self, _storage_id: &str) -> Option<PathBuf> {
        None
    }
}

/// The object store selected by configuration
#[derive(Debug)]
pub enum AnyObjectStore {
    Local(LocalObjectStore),
    Cloud(CloudObjectStore),
}

impl ObjectStore for AnyObjectStore {
    async fn put(&self, upload: ImageUpload) -> Result<StoredObject, StoreError> {
        match self {
            AnyObjectStore::Local(store) => store.put(upload).await,
            AnyObjectStore::Cloud(store) => store.put(upload).await,
        }
    }

    fn local_blob(&self, storage_id: &str) -> Option<PathBuf> {
        match self {
            AnyObjectStore::Local(store) => store.local_blob(storage_id),
            AnyObjectStore::Cloud(store) => store.local_blob(storage_id),
        }
    }
}
