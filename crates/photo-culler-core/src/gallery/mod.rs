//! Collaborators the engine talks to: where photos come from, how they are
//! deleted, and how full the device is.
//!
//! The engine only ever sees these traits. [`DirectoryGallery`] and
//! [`DiskStorage`] back them with the local filesystem; [`MemoryGallery`]
//! keeps everything in memory for tests and embedding.

use crate::error::{FetchError, Result};
use crate::types::{AssetId, PhotoAsset, StorageUsage};

pub mod directory;
pub mod memory;
pub mod storage;

pub use directory::DirectoryGallery;
pub use memory::MemoryGallery;
pub use storage::DiskStorage;

/// Source of photos.
///
/// `fetch_bytes` is called concurrently from the extraction pool, hence `Sync`.
pub trait Gallery: Sync {
    /// Every photo currently in the gallery.
    ///
    /// Fails with [`Error::PermissionDenied`](crate::Error::PermissionDenied)
    /// when access has not been granted.
    fn list_assets(&self) -> Result<Vec<PhotoAsset>>;

    /// Raw encoded bytes of one photo
    fn fetch_bytes(&self, id: &AssetId) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Removes photos by id.
///
/// A deleter that can fail after removing some photos reports them through
/// [`Error::PartialDeletion`](crate::Error::PartialDeletion).
pub trait AssetDeleter {
    fn delete_by_ids(&self, ids: &[AssetId]) -> Result<()>;
}

/// Reports device storage
pub trait StorageInfo {
    fn usage(&self) -> Result<StorageUsage>;
}

/// File extensions recognised as photos
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "tif", "tiff", "bmp"];

/// Returns if the given path has a photo extension
pub fn is_image_path(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
