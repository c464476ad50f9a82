use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::{InspectError, Result};

/// Raster formats accepted from uploads.
pub const ALLOWED_FORMATS: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::WebP];

/// File extensions accepted from uploads, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Read and decode an image file.
pub fn load(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| InspectError::ImageDecode(format!("cannot read {}: {}", path.display(), e)))?;
    load_from_memory(&bytes)
}

/// Decode an in-memory image, sniffing the format from its content.
pub fn load_from_memory(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(InspectError::ImageDecode("input is empty".to_string()));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| InspectError::ImageDecode(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| InspectError::ImageDecode("unrecognised image data".to_string()))?;
    if !ALLOWED_FORMATS.contains(&format) {
        return Err(InspectError::ImageDecode(format!("unsupported format {format:?}")));
    }

    let img = reader
        .decode()
        .map_err(|e| InspectError::ImageDecode(format!("failed to decode {format:?}: {e}")))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(InspectError::ImageDecode("image has no pixels".to_string()));
    }

    Ok(img)
}

/// Whether a filename carries one of [`ALLOWED_EXTENSIONS`].
pub fn is_allowed_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Reduce an uploaded filename to a stem that is safe to embed in an output
/// filename.
pub fn sanitize_file_stem(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
