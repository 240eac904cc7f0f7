use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use super::data::{ImageRecord, NewImageRecord};
use super::RecordStore;
use crate::error::RecordError;

/// The Library manages the SQLite catalog database.
/// It stores one row per uploaded image: where the object store put it
/// and what the object store told us about it.
pub struct Library {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the catalog at `db_path` and initialize the schema.
    ///
    /// `:memory:` opens a private in-memory catalog.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let db_path = db_path.into();

        let conn = if db_path == Path::new(":memory:") {
            Connection::open_in_memory()?
        } else {
            // Ensure the parent directory exists
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(&db_path)?
        };

        info!("📁 Catalog opened at: {}", db_path.display());

        let library = Library {
            conn: Mutex::new(conn),
            db_path,
        };
        library.init_schema()?;

        Ok(library)
    }

    /// A throwaway catalog, used by tests and `GALLERY_DATABASE=:memory:`
    pub fn in_memory() -> Result<Self, RecordError> {
        Self::open(":memory:")
    }

    /// Get the path where the database is stored by default
    ///
    /// - Linux: ~/.local/share/gallery-wall/gallery.db
    /// - macOS: ~/Library/Application Support/gallery-wall/gallery.db
    /// - Windows: %APPDATA%\gallery-wall\gallery.db
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("gallery-wall");
        path.push("gallery.db");
        path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RecordError> {
        self.conn.lock().map_err(|_| RecordError::Poisoned)
    }

    /// Creates the images table and its listing index if they don't exist.
    fn init_schema(&self) -> Result<(), RecordError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS images (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                url             TEXT NOT NULL,
                storage_id      TEXT NOT NULL,
                original_name   TEXT NOT NULL,
                format          TEXT NOT NULL,
                width           INTEGER NOT NULL,
                height          INTEGER NOT NULL,
                created_at      INTEGER NOT NULL
            )",
            [],
        )?;

        // Listing is always newest first
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_images_created_at
             ON images(created_at DESC, id DESC)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Get a count of images in the catalog
    pub fn image_count(&self) -> Result<i64, RecordError> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert a new record, stamping it with the current time.
    /// Returns the record as stored.
    pub fn insert_image(&self, new: NewImageRecord) -> Result<ImageRecord, RecordError> {
        let created_at = Utc::now();
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO images (url, storage_id, original_name, format, width, height, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.url,
                new.storage_id,
                new.original_name,
                new.format,
                new.width,
                new.height,
                created_at.timestamp_millis(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        // Round-trip through millis so the returned record matches what a listing returns
        let created_at = Utc
            .timestamp_millis_opt(created_at.timestamp_millis())
            .single()
            .unwrap_or(created_at);

        Ok(ImageRecord {
            id,
            url: new.url,
            storage_id: new.storage_id,
            original_name: new.original_name,
            format: new.format,
            width: new.width,
            height: new.height,
            created_at,
        })
    }

    /// Get all images from the catalog, newest first.
    /// Records sharing a timestamp are ordered by descending ID.
    pub fn get_all_images(&self) -> Result<Vec<ImageRecord>, RecordError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, url, storage_id, original_name, format, width, height, created_at
             FROM images
             ORDER BY created_at DESC, id DESC",
        )?;

        let images = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(images)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ImageRecord> {
    let millis: i64 = row.get(7)?;
    let created_at = Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(7, millis)
    })?;

    Ok(ImageRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        storage_id: row.get(2)?,
        original_name: row.get(3)?,
        format: row.get(4)?,
        width: row.get(5)?,
        height: row.get(6)?,
        created_at,
    })
}

impl RecordStore for Library {
    fn insert(&self, record: NewImageRecord) -> Result<ImageRecord, RecordError> {
        self.insert_image(record)
    }

    fn list_newest_first(&self) -> Result<Vec<ImageRecord>, RecordError> {
        self.get_all_images()
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
