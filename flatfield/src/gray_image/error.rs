use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing an image file.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to write image '{path}': {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Unsupported file extension: '{extension}'")]
    UnsupportedFormat { extension: String },
}
