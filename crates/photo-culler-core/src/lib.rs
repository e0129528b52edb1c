//! Core functionality for picking which photos to delete.
//!
//! This library provides the components of an on-device photo culling engine:
//! - Feature extraction from encoded photo bytes (digest, fingerprint, quality metrics)
//! - A deterministic badness score
//! - Exact and near-duplicate detection
//! - A stateful top-K selection that never repeats itself within a session
//!
//! Photos come from a [`gallery::Gallery`]; nothing leaves the device.

// -- External Dependencies --
use log::{debug, info, warn};

// -- Standard Library --
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, ExtractError, FetchError, Result, SkipReason};
pub use types::*;

// -- Public Modules --
pub mod config;
pub mod deduplication;
pub mod gallery;
pub mod logging;
pub mod processing;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod types;

// -- Test Modules --
#[cfg(test)]
mod test_utils;

use deduplication::DuplicateClusterer;
use gallery::{AssetDeleter, Gallery, StorageInfo};
use processing::{
    AestheticScorer, BatchScheduler, FaceCounter, FeatureExtractor, NeutralAesthetic,
    NoFaceDetection, ScanProgress,
};
use scoring::{Penalty, ScoringEngine};
use session::Session;

/// Main entry point: owns the session and runs scans and selections.
///
/// `F` and `A` are the optional face counter and aesthetic scorer; the
/// defaults contribute neutral values.
pub struct PhotoCuller<F = NoFaceDetection, A = NeutralAesthetic> {
    config: Config,
    extractor: FeatureExtractor<F, A>,
    scheduler: BatchScheduler,
    scoring: ScoringEngine,
    clusterer: DuplicateClusterer,
    session: Session,
}

impl PhotoCuller {
    /// Create a new PhotoCuller with the provided configuration
    pub fn new(config: Config) -> Result<Self> {
        Self::with_scorers(config, NoFaceDetection, NeutralAesthetic)
    }
}

impl<F: FaceCounter, A: AestheticScorer> PhotoCuller<F, A> {
    /// Create a PhotoCuller with learned-model scorers plugged in
    pub fn with_scorers(config: Config, face_counter: F, aesthetic_scorer: A) -> Result<Self> {
        config.validate()?;

        let extractor = FeatureExtractor::with_scorers(&config, face_counter, aesthetic_scorer);
        let scheduler = BatchScheduler::new(&config)?;
        let scoring = ScoringEngine::new(config.scoring.clone());
        let clusterer = DuplicateClusterer::new(config.clustering.clone());

        Ok(Self {
            config,
            extractor,
            scheduler,
            scoring,
            clusterer,
            session: Session::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Scan the whole gallery and replace the photo table
    pub fn scan<G: Gallery + ?Sized>(&mut self, gallery: &G) -> Result<ScanSummary> {
        self.scan_with(gallery, &AtomicBool::new(false), None)
    }

    /// Scan with cancellation and progress reporting.
    ///
    /// The table is swapped in only when the scan completes; a failed or
    /// cancelled scan leaves the session exactly as it was.
    pub fn scan_with<G: Gallery + ?Sized>(
        &mut self,
        gallery: &G,
        cancel: &AtomicBool,
        progress: Option<&mut dyn FnMut(ScanProgress)>,
    ) -> Result<ScanSummary> {
        let start = Instant::now();

        info!("Listing gallery...");
        let assets = gallery.list_assets()?;
        info!("Found {} photos", assets.len());

        let report = self
            .scheduler
            .run(gallery, assets, &self.extractor, cancel, progress)?;

        let photos: Vec<ScoredPhoto> = report
            .analyzed
            .into_iter()
            .map(|(asset, features)| {
                let score = self.scoring.score(&features);
                ScoredPhoto {
                    asset,
                    features: Arc::new(features),
                    score,
                }
            })
            .collect();

        let summary = ScanSummary {
            listed: report.listed,
            analyzed: photos.len(),
            skipped: report.skipped,
            elapsed: start.elapsed(),
        };

        self.session.replace_photos(photos);
        if self.config.reset_seen_on_scan {
            self.session.clear_seen();
        }

        info!(
            "Scan complete: {} of {} photos analyzed, {} skipped in {:.2?}",
            summary.analyzed,
            summary.listed,
            summary.skipped.len(),
            summary.elapsed
        );
        Ok(summary)
    }

    /// Up to `k` deletion candidates not returned before in this session and
    /// not in `excluded`. Every returned id is remembered as seen.
    pub fn select(&mut self, excluded: &[AssetId], k: usize) -> SelectionResult {
        let result = selection::select(
            self.session.photos(),
            self.session.seen(),
            excluded,
            k,
            &self.clusterer,
        );

        self.session.mark_seen(result.ids());
        debug!(
            "Selected {} photos, {} seen so far",
            result.len(),
            self.session.seen_count()
        );
        result
    }

    /// [`select`](Self::select) with the configured selection size
    pub fn select_default(&mut self, excluded: &[AssetId]) -> SelectionResult {
        self.select(excluded, self.config.selection_size)
    }

    /// Forget the photo table and every surfaced id
    pub fn reset(&mut self) {
        self.session.clear();
    }

    /// Allow previously surfaced photos to be selected again
    pub fn reset_seen(&mut self) {
        self.session.clear_seen();
    }

    /// Drop photos the caller deleted elsewhere. Returns how many were in the table.
    pub fn confirm_deleted(&mut self, ids: &[AssetId]) -> usize {
        let removed = self.session.remove(ids);
        info!("Removed {} deleted photos from the session", removed);
        removed
    }

    /// Delete through `deleter`, then drop the ids from the session.
    ///
    /// On a partial failure the photos that did go are still dropped before
    /// the error is returned.
    pub fn delete<D: AssetDeleter + ?Sized>(&mut self, deleter: &D, ids: &[AssetId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        match deleter.delete_by_ids(ids) {
            Ok(()) => Ok(self.confirm_deleted(ids)),
            Err(Error::PartialDeletion { deleted, reason }) => {
                warn!(
                    "Deletion stopped after {} of {} photos: {}",
                    deleted.len(),
                    ids.len(),
                    reason
                );
                self.confirm_deleted(&deleted);
                Err(Error::PartialDeletion { deleted, reason })
            }
            Err(e) => Err(e),
        }
    }

    /// Read-only view of the current photo table
    pub fn snapshot(&self) -> Arc<[ScoredPhoto]> {
        self.session.snapshot()
    }

    pub fn seen_count(&self) -> usize {
        self.session.seen_count()
    }

    /// Which scoring rules fired for a photo
    pub fn explain(&self, photo: &ScoredPhoto) -> Vec<Penalty> {
        self.scoring.explain(&photo.features)
    }

    /// Device storage; zeroed when it cannot be read
    pub fn storage_usage(&self, storage: &dyn StorageInfo) -> StorageUsage {
        match storage.usage() {
            Ok(usage) => usage,
            Err(e) => {
                warn!("Storage usage unavailable: {}", e);
                StorageUsage::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::MemoryGallery;
    use crate::test_utils::{encode_png, gradient_image, noise_image, timestamp};

    struct BrokenStorage;

    impl StorageInfo for BrokenStorage {
        fn usage(&self) -> Result<StorageUsage> {
            Err(Error::Storage("no disks".to_string()))
        }
    }

    /// Removes only the first id, then fails
    struct FirstOnlyDeleter;

    impl AssetDeleter for FirstOnlyDeleter {
        fn delete_by_ids(&self, ids: &[AssetId]) -> Result<()> {
            Err(Error::PartialDeletion {
                deleted: ids[..1].to_vec(),
                reason: "disk full".to_string(),
            })
        }
    }

    struct FixedStorage(StorageUsage);

    impl StorageInfo for FixedStorage {
        fn usage(&self) -> Result<StorageUsage> {
            Ok(self.0)
        }
    }

    fn gallery_of(count: usize) -> MemoryGallery {
        let gallery = MemoryGallery::new();
        for i in 0..count {
            gallery.add(
                PhotoAsset::new(format!("p{:02}.png", i), timestamp(i as i64)),
                encode_png(&noise_image(32, 32, i as u64 + 1)),
            );
        }
        gallery
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            batch_size: 0,
            ..Config::default()
        };
        assert!(matches!(PhotoCuller::new(config), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_scan_scores_every_photo() {
        let mut culler = PhotoCuller::new(Config::default()).unwrap();
        let summary = culler.scan(&gallery_of(4)).unwrap();

        assert_eq!(summary.listed, 4);
        assert_eq!(summary.analyzed, 4);
        let snapshot = culler.snapshot();
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.iter().all(|p| (0.0..=100.0).contains(&p.score)));
    }

    #[test]
    fn test_select_marks_seen() {
        let mut culler = PhotoCuller::new(Config::default()).unwrap();
        culler.scan(&gallery_of(5)).unwrap();

        let first = culler.select(&[], 2);
        assert_eq!(first.len(), 2);
        assert_eq!(culler.seen_count(), 2);

        culler.reset_seen();
        assert_eq!(culler.seen_count(), 0);
        assert_eq!(culler.snapshot().len(), 5);
    }

    #[test]
    fn test_rescan_keeps_seen_unless_configured() {
        let gallery = gallery_of(3);

        let mut culler = PhotoCuller::new(Config::default()).unwrap();
        culler.scan(&gallery).unwrap();
        culler.select(&[], 1);
        culler.scan(&gallery).unwrap();
        assert_eq!(culler.seen_count(), 1);

        let config = Config {
            reset_seen_on_scan: true,
            ..Config::default()
        };
        let mut culler = PhotoCuller::new(config).unwrap();
        culler.scan(&gallery).unwrap();
        culler.select(&[], 1);
        culler.scan(&gallery).unwrap();
        assert_eq!(culler.seen_count(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut culler = PhotoCuller::new(Config::default()).unwrap();
        culler.scan(&gallery_of(3)).unwrap();
        culler.select_default(&[]);
        culler.reset();
        assert_eq!(culler.seen_count(), 0);
        assert!(culler.snapshot().is_empty());
        assert!(culler.select_default(&[]).is_empty());
    }

    #[test]
    fn test_delete_updates_gallery_and_session() {
        let gallery = gallery_of(3);
        let mut culler = PhotoCuller::new(Config::default()).unwrap();
        culler.scan(&gallery).unwrap();

        let picked = culler.select(&[], 1).ids();
        assert_eq!(culler.delete(&gallery, &picked).unwrap(), 1);

        assert_eq!(gallery.len(), 2);
        assert_eq!(culler.snapshot().len(), 2);
        assert_eq!(culler.seen_count(), 0);
    }

    #[test]
    fn test_partial_delete_drops_removed_photos() {
        let mut culler = PhotoCuller::new(Config::default()).unwrap();
        culler.scan(&gallery_of(3)).unwrap();

        let ids = vec![AssetId::new("p00.png"), AssetId::new("p01.png")];
        let result = culler.delete(&FirstOnlyDeleter, &ids);

        assert!(matches!(result, Err(Error::PartialDeletion { ref deleted, .. }) if deleted.len() == 1));
        let remaining: Vec<AssetId> = culler.snapshot().iter().map(|p| p.id().clone()).collect();
        assert_eq!(remaining, vec![AssetId::new("p01.png"), AssetId::new("p02.png")]);
    }

    #[test]
    fn test_explain_matches_score() {
        let gallery = MemoryGallery::new();
        gallery.add(
            PhotoAsset::new("smooth.png", timestamp(0)),
            encode_png(&gradient_image(64, 64)),
        );
        let mut culler = PhotoCuller::new(Config::default()).unwrap();
        culler.scan(&gallery).unwrap();

        let snapshot = culler.snapshot();
        let photo = &snapshot[0];
        let total: f64 = culler.explain(photo).iter().map(|p| p.points).sum();
        assert_eq!(total.clamp(0.0, 100.0), photo.score);
    }

    #[test]
    fn test_storage_usage() {
        let culler = PhotoCuller::new(Config::default()).unwrap();
        assert_eq!(culler.storage_usage(&BrokenStorage), StorageUsage::default());

        let usage = StorageUsage {
            total_bytes: 100,
            free_bytes: 40,
        };
        assert_eq!(culler.storage_usage(&FixedStorage(usage)), usage);
    }
}
