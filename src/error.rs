use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the inspection pipeline.
///
/// A `Fail` verdict is not an error: it comes back as a successful
/// [`VerdictResult`](crate::models::VerdictResult). Everything here means the
/// inspection itself could not be carried out.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The input was missing, empty, undecodable or in a raster format
    /// outside the upload allow-list.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Rejected at configuration-construction time.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The annotated output could not be written.
    #[error("failed to persist annotated image to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The annotated output could not be encoded to bytes.
    #[error("failed to encode annotated image: {0}")]
    Encode(String),
}

impl InspectError {
    /// True for errors caused by the caller's input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::ImageDecode(_))
    }
}

pub type Result<T> = std::result::Result<T, InspectError>;
