/// Server configuration
///
/// Everything comes from environment variables with embedded defaults.
/// The hosted image CDN is used only when all three of its credentials are set;
/// otherwise uploads go to a media directory served by this process.
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::state::Library;
use crate::storage::{CloudCredentials, LocalObjectStore};

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub cloud: CloudCredentials,
    /// SQLite catalog path, or `:memory:`
    pub database: PathBuf,
    pub static_dir: PathBuf,
    pub media_dir: PathBuf,
    /// Origin used to build URLs of locally stored images
    pub public_url: String,
}

impl Config {
    /// Read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; unset and empty values take the default
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            cloud: CloudCredentials {
                cloud_name: var("GALLERY_CLOUD_NAME").unwrap_or_default(),
                api_key: var("GALLERY_API_KEY").unwrap_or_default(),
                api_secret: var("GALLERY_API_SECRET").unwrap_or_default(),
            },
            database: var("GALLERY_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(Library::default_db_path),
            static_dir: var("GALLERY_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            media_dir: var("GALLERY_MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(LocalObjectStore::default_dir),
            public_url: var("GALLERY_PUBLIC_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
        })
    }

    pub fn uses_cloud_storage(&self) -> bool {
        self.cloud.is_complete()
    }
}
