/// Shared data structures for the gallery catalog
///
/// These structs represent the data model that flows between
/// the database layer, the HTTP layer and the scene.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One uploaded image, as persisted in the catalog
///
/// Records are created once by the upload endpoint and never
/// modified or deleted afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Unique database ID
    pub id: i64,
    /// Public URL handed out by the object store
    pub url: String,
    /// Identifier assigned by the object store
    pub storage_id: String,
    /// File name as sent by the browser (e.g. "holiday.jpg")
    pub original_name: String,
    /// Short format name reported by the object store ("png", "jpg", ...)
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

/// Everything the catalog needs to insert a new record.
/// The ID and creation time are assigned by the catalog itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImageRecord {
    pub url: String,
    pub storage_id: String,
    pub original_name: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
}

/// Reply of the upload endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Permanent public URL of the stored image
    pub image_url: String,
    /// ID of the new catalog record
    pub id: i64,
}
