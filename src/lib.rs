//! A floating 3D wall of images and the small backend that keeps it populated.
//!
//! The server half (`http`, `storage`, `state`) accepts image uploads, stores the bytes
//! in an object store and their metadata in a SQLite catalog, and lists them back newest
//! first. The client half (`scene`) keeps the displayed objects in sync with that listing
//! and with images dropped onto the page, independent of the renderer that draws them.

pub mod config;
pub mod error;
pub mod http;
pub mod scene;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{ConfigError, GalleryError, RecordError, StoreError};
