use std::path::PathBuf;
use thiserror::Error;

use crate::types::AssetId;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the photo-culler library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Gallery access has not been granted; fatal to a scan
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The caller abandoned a scan before it completed
    #[error("Scan cancelled")]
    Cancelled,

    /// The deletion collaborator reported a failure
    #[error("Deletion failed: {0}")]
    Deletion(String),

    /// Deletion stopped part way; `deleted` are already gone
    #[error("Deletion failed after removing {} photos: {reason}", .deleted.len())]
    PartialDeletion {
        deleted: Vec<AssetId>,
        reason: String,
    },

    /// Storage usage could not be read
    #[error("Storage query failed: {0}")]
    Storage(String),

    /// Unknown error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Failure to turn encoded bytes into a feature set.
///
/// Always per-item: the batch scheduler records it as a skip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Unreadable or corrupt bytes
    #[error("decode error: {0}")]
    Decode(String),

    /// Bytes are in a format the codec layer cannot handle
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl From<image::ImageError> for ExtractError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => ExtractError::UnsupportedFormat(e.to_string()),
            other => ExtractError::Decode(other.to_string()),
        }
    }
}

/// Failure to retrieve the raw bytes of an asset from the gallery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("asset not found: {0}")]
    NotFound(AssetId),

    #[error("read failed: {0}")]
    Io(String),
}

/// Why an asset is absent from the photo table after a scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("extraction panicked: {0}")]
    Panic(String),
}
