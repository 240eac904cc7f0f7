use std::future::Future;
use thiserror::Error;

use crate::state::{ImageRecord, UploadReceipt};
use crate::storage::ImageUpload;

/// Failures seen by the scene when talking to the gallery server
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unreadable server response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The two gallery endpoints, as the scene sees them
pub trait GalleryApi: Send + Sync + 'static {
    /// `GET /api/images`: every persisted record, newest first
    fn list_images(&self) -> impl Future<Output = Result<Vec<ImageRecord>, ApiError>> + Send;

    /// `POST /api/upload`: store one image and return its permanent URL
    fn upload_image(
        &self,
        upload: ImageUpload,
    ) -> impl Future<Output = Result<UploadReceipt, ApiError>> + Send;
}
