use hyper::StatusCode;
use thiserror::Error;

/// Failures of the record store (the SQLite catalog)
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("could not prepare catalog directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog lock poisoned")]
    Poisoned,

    #[error("catalog task failed: {0}")]
    Join(String),
}

/// Failures of an object store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage request failed: {0}")]
    Http(String),

    #[error("storage provider answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unreadable storage response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not a readable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Everything that can go wrong while serving a request.
///
/// Converted to a JSON `{ "error": ... }` body at the handler boundary.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("no file was uploaded")]
    MissingFile,

    #[error("uploaded file is not an image ({0})")]
    NotAnImage(String),

    #[error("malformed upload: {0}")]
    MalformedForm(String),

    /// The object store rejected or never received the upload. No record was written.
    #[error("failed to store image: {0}")]
    UpstreamStorage(#[source] StoreError),

    /// The blob exists in the object store but its record could not be written.
    #[error("failed to record image: {0}")]
    Persistence(#[source] RecordError),

    #[error("gallery listing unavailable: {0}")]
    ListingUnavailable(#[source] RecordError),

    #[error("not found")]
    NotFound,
}

impl GalleryError {
    pub fn status(&self) -> StatusCode {
        match self {
            GalleryError::MissingFile
            | GalleryError::NotAnImage(_)
            | GalleryError::MalformedForm(_) => StatusCode::BAD_REQUEST,
            GalleryError::NotFound => StatusCode::NOT_FOUND,
            GalleryError::UpstreamStorage(_)
            | GalleryError::Persistence(_)
            | GalleryError::ListingUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<multer::Error> for GalleryError {
    fn from(err: multer::Error) -> Self {
        GalleryError::MalformedForm(err.to_string())
    }
}

/// Invalid environment configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
}
