use std::collections::HashSet;
use std::sync::Arc;

use crate::types::{AssetId, ScoredPhoto};

/// Per-process culling state: the current photo table and the ids already
/// surfaced to the user.
///
/// The table is replaced wholesale after each completed scan, so a snapshot
/// taken earlier keeps a consistent view.
#[derive(Debug, Clone)]
pub struct Session {
    photos: Arc<[ScoredPhoto]>,
    seen: HashSet<AssetId>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            photos: Arc::from(Vec::new()),
            seen: HashSet::new(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photos(&self) -> &[ScoredPhoto] {
        &self.photos
    }

    pub fn snapshot(&self) -> Arc<[ScoredPhoto]> {
        Arc::clone(&self.photos)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Swap in the table built by a completed scan
    pub fn replace_photos(&mut self, photos: Vec<ScoredPhoto>) {
        self.photos = Arc::from(photos);
    }

    pub fn seen(&self) -> &HashSet<AssetId> {
        &self.seen
    }

    pub fn is_seen(&self, id: &AssetId) -> bool {
        self.seen.contains(id)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn mark_seen<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = AssetId>,
    {
        self.seen.extend(ids);
    }

    pub fn clear_seen(&mut self) {
        self.seen.clear();
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.photos = Arc::from(Vec::new());
        self.seen.clear();
    }

    /// Drop deleted photos from the table and from the seen set.
    /// Returns how many table entries were removed.
    pub fn remove(&mut self, ids: &[AssetId]) -> usize {
        let doomed: HashSet<&AssetId> = ids.iter().collect();
        for id in ids {
            self.seen.remove(id);
        }

        let before = self.photos.len();
        let remaining: Vec<ScoredPhoto> = self
            .photos
            .iter()
            .filter(|p| !doomed.contains(p.id()))
            .cloned()
            .collect();
        let removed = before - remaining.len();
        if removed > 0 {
            self.photos = Arc::from(remaining);
        }
        removed
    }
}
