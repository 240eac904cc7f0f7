/// Image probing
///
/// Reads just enough of an encoded image to learn its format and size.
/// No decoding of pixel data, no resizing.
use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use image::{ImageError, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::error::StoreError;

/// Format and dimensions of an encoded image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Short format name, e.g. "png" or "jpg"
    pub format: String,
    pub width: u32,
    pub height: u32,
}

/// Probe an encoded image from memory
pub fn probe(bytes: &[u8]) -> Result<ImageInfo, StoreError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;

    let format = reader.format().ok_or_else(|| {
        ImageError::Unsupported(UnsupportedError::from_format_and_kind(
            ImageFormatHint::Unknown,
            UnsupportedErrorKind::Format(ImageFormatHint::Unknown),
        ))
    })?;

    let (width, height) = reader.into_dimensions()?;

    Ok(ImageInfo {
        format: format_name(format),
        width,
        height,
    })
}

/// Probe on the blocking pool; header parsing can touch the whole buffer for some formats
pub async fn probe_async(bytes: bytes::Bytes) -> Result<ImageInfo, StoreError> {
    tokio::task::spawn_blocking(move || probe(&bytes))
        .await
        .map_err(|e| StoreError::Http(format!("probe task failed: {}", e)))?
}

fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| format!("{:?}", format).to_lowercase())
}
