//! Encoding and persisting annotated images.
//!
//! The pipeline itself never touches the filesystem; these helpers are what a
//! calling layer uses to store results.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, RgbImage};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::detection::loader::sanitize_file_stem;
use crate::error::{InspectError, Result};
use crate::models::VerdictResult;

/// Encodings offered for annotated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Build `processed_<unix-nanos>_<id>_<stem>.<ext>`.
pub fn output_file_name(source_name: &str, timestamp_nanos: i128, id: Uuid, format: OutputFormat) -> String {
    format!(
        "processed_{}_{}_{}.{}",
        timestamp_nanos,
        id.simple(),
        sanitize_file_stem(source_name),
        format.extension()
    )
}

/// A fresh output name; distinct across concurrent callers.
pub fn unique_output_name(source_name: &str, format: OutputFormat) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp_nanos();
    output_file_name(source_name, now, Uuid::new_v4(), format)
}

/// Encode an RGB image into an in-memory buffer.
pub fn encode_image(image: &RgbImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), format.image_format())
        .map_err(|e| InspectError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Bytes of the annotated image, for callers that own their storage.
pub fn encode_annotated(result: &VerdictResult, format: OutputFormat) -> Result<Vec<u8>> {
    encode_image(&result.annotated_image, format)
}

/// Write the annotated image into `dir` under a unique name and return its path.
///
/// `dir` is created if missing.
pub fn save_annotated(
    result: &VerdictResult,
    dir: impl AsRef<Path>,
    source_name: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let path = dir.join(unique_output_name(source_name, format));
    let bytes = encode_annotated(result, format)?;
    write_bytes(&path, &bytes)?;
    Ok(path)
}

pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| InspectError::Persist {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| InspectError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

/// Map an `image` save failure to a persist or encode error.
pub(crate) fn save_error(path: &Path, err: ImageError) -> InspectError {
    match err {
        ImageError::IoError(source) => InspectError::Persist {
            path: path.to_path_buf(),
            source,
        },
        other => InspectError::Encode(other.to_string()),
    }
}
