use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{AssetDeleter, Gallery};
use crate::error::{Error, FetchError, Result};
use crate::types::{AssetId, PhotoAsset};

#[derive(Default)]
struct Inner {
    assets: Vec<PhotoAsset>,
    bytes: HashMap<AssetId, Vec<u8>>,
}

/// Gallery held entirely in memory.
///
/// Listing order is insertion order. An asset can be listed without bytes to
/// model a photo that disappears between listing and fetching.
#[derive(Default)]
pub struct MemoryGallery {
    inner: Mutex<Inner>,
    denied: AtomicBool,
}

impl MemoryGallery {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a photo with its encoded bytes
    pub fn add(&self, asset: PhotoAsset, bytes: Vec<u8>) {
        let mut state = self.state();
        state.bytes.insert(asset.id.clone(), bytes);
        state.assets.push(asset);
    }

    /// Add a photo that is listed but whose bytes cannot be fetched
    pub fn add_listing_only(&self, asset: PhotoAsset) {
        self.state().assets.push(asset);
    }

    /// Simulate the user refusing (or granting) library access
    pub fn set_permission_denied(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.state().assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.state().assets.iter().any(|a| &a.id == id)
    }

    fn check_access(&self) -> Result<()> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(Error::PermissionDenied(
                "photo library access not granted".to_string(),
            ));
        }
        Ok(())
    }
}

impl Gallery for MemoryGallery {
    fn list_assets(&self) -> Result<Vec<PhotoAsset>> {
        self.check_access()?;
        Ok(self.state().assets.clone())
    }

    fn fetch_bytes(&self, id: &AssetId) -> std::result::Result<Vec<u8>, FetchError> {
        self.state()
            .bytes
            .get(id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(id.clone()))
    }
}

impl AssetDeleter for MemoryGallery {
    /// All-or-nothing: unknown ids fail the whole call
    fn delete_by_ids(&self, ids: &[AssetId]) -> Result<()> {
        self.check_access()?;

        let mut state = self.state();
        if let Some(missing) = ids.iter().find(|id| !state.assets.iter().any(|a| &a.id == *id)) {
            return Err(Error::Deletion(format!("unknown asset {}", missing)));
        }

        let doomed: HashSet<&AssetId> = ids.iter().collect();
        state.assets.retain(|a| !doomed.contains(&a.id));
        for id in ids {
            state.bytes.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::timestamp;

    fn gallery() -> MemoryGallery {
        let gallery = MemoryGallery::new();
        gallery.add(PhotoAsset::new("a", timestamp(0)), vec![1, 2, 3]);
        gallery.add(PhotoAsset::new("b", timestamp(1)), vec![4, 5]);
        gallery.add_listing_only(PhotoAsset::new("ghost", timestamp(2)));
        gallery
    }

    #[test]
    fn test_listing_keeps_insertion_order() {
        let ids: Vec<_> = gallery()
            .list_assets()
            .unwrap()
            .into_iter()
            .map(|a| a.id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "ghost"]);
    }

    #[test]
    fn test_fetch() {
        let gallery = gallery();
        assert_eq!(gallery.fetch_bytes(&AssetId::new("b")).unwrap(), vec![4, 5]);
        assert_eq!(
            gallery.fetch_bytes(&AssetId::new("ghost")),
            Err(FetchError::NotFound(AssetId::new("ghost")))
        );
    }

    #[test]
    fn test_permission_denied() {
        let gallery = gallery();
        gallery.set_permission_denied(true);
        assert!(matches!(gallery.list_assets(), Err(Error::PermissionDenied(_))));
        gallery.set_permission_denied(false);
        assert_eq!(gallery.list_assets().unwrap().len(), 3);
    }

    #[test]
    fn test_delete() {
        let gallery = gallery();
        gallery.delete_by_ids(&[AssetId::new("a")]).unwrap();
        assert!(!gallery.contains(&AssetId::new("a")));
        assert_eq!(gallery.len(), 2);
    }

    #[test]
    fn test_delete_unknown_is_all_or_nothing() {
        let gallery = gallery();
        let result = gallery.delete_by_ids(&[AssetId::new("a"), AssetId::new("zzz")]);
        assert!(matches!(result, Err(Error::Deletion(_))));
        assert!(gallery.contains(&AssetId::new("a")));
    }
}
