/// Catalog state module
///
/// This module handles everything the server persists:
/// - The image record types shared with the HTTP layer and the scene (data.rs)
/// - The SQLite catalog that stores them (library.rs)

pub mod data;
pub mod library;

pub use data::{ImageRecord, NewImageRecord, UploadReceipt};
pub use library::Library;

use crate::error::RecordError;

/// The record store behind the upload and listing endpoints.
///
/// Calls are blocking; the server runs them on the blocking pool.
/// Implementations must serialize their own writes.
pub trait RecordStore: Send + Sync + 'static {
    /// Persist a new record and return it with its assigned ID and creation time
    fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, RecordError>;

    /// All records, newest first
    fn list_newest_first(&self) -> Result<Vec<ImageRecord>, RecordError>;
}
