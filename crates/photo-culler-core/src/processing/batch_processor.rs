//! Runs feature extraction over a whole gallery.
//!
//! Assets are processed in sequential batches so memory stays bounded by the
//! batch size rather than the gallery size. Within a batch every asset is a
//! task on a dedicated rayon pool; each task sends `(AssetId, ExtractOutcome)`
//! back over a crossbeam channel and results are matched to the listing by id,
//! never by completion order.
//!
//! Per-asset failures (missing bytes, corrupt data, unsupported formats, even
//! panics inside a scorer) become [`SkipRecord`]s. Only cancellation and
//! pool construction fail a run.
//!
//! # Example
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use photo_culler_core::gallery::{DirectoryGallery, Gallery};
//! use photo_culler_core::processing::{BatchScheduler, FeatureExtractor};
//! use photo_culler_core::Config;
//!
//! let config = Config::default();
//! let gallery = DirectoryGallery::new("/photos");
//! let assets = gallery.list_assets()?;
//! let scheduler = BatchScheduler::new(&config)?;
//! let extractor = FeatureExtractor::new(&config);
//! let report = scheduler.run(&gallery, assets, &extractor, &AtomicBool::new(false), None)?;
//! println!("{} analyzed, {} skipped", report.analyzed.len(), report.skipped.len());
//! # Ok::<(), photo_culler_core::Error>(())
//! ```

use crossbeam::channel;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use super::extractor::FeatureExtractor;
use super::progress::ScanProgress;
use super::scorers::{AestheticScorer, FaceCounter};
use super::types::{ExtractOutcome, FeatureSet};
use crate::config::Config;
use crate::error::{Error, Result, SkipReason};
use crate::gallery::Gallery;
use crate::logging::log_skip;
use crate::types::{AssetId, PhotoAsset, SkipRecord};

/// Result of a completed run, in listing order
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Distinct assets in the listing
    pub listed: usize,
    pub analyzed: Vec<(PhotoAsset, FeatureSet)>,
    pub skipped: Vec<SkipRecord>,
}

/// Bounded-concurrency extraction over many assets
pub struct BatchScheduler {
    pool: rayon::ThreadPool,
    batch_size: usize,
}

impl BatchScheduler {
    pub fn new(config: &Config) -> Result<Self> {
        let threads = config.effective_threads();
        info!("Using {} threads for feature extraction", threads);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("photo-culler-worker-{}", i))
            .build()
            .map_err(|e| Error::Unknown(format!("Failed to build thread pool: {}", e)))?;

        Ok(Self {
            pool,
            batch_size: config.batch_size.max(1),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Extract features for every asset.
    ///
    /// `cancel` is checked before each batch; once set, the run stops with
    /// [`Error::Cancelled`] and nothing gathered so far is returned.
    pub fn run<G, F, A>(
        &self,
        gallery: &G,
        assets: Vec<PhotoAsset>,
        extractor: &FeatureExtractor<F, A>,
        cancel: &AtomicBool,
        mut progress: Option<&mut dyn FnMut(ScanProgress)>,
    ) -> Result<ScanReport>
    where
        G: Gallery + ?Sized,
        F: FaceCounter,
        A: AestheticScorer,
    {
        let mut notify = |event: ScanProgress| {
            if let Some(callback) = progress.as_deref_mut() {
                callback(event);
            }
        };

        let assets = dedupe_assets(assets);
        let total = assets.len();
        let batches = total.div_ceil(self.batch_size);

        info!(
            "Analyzing {} photos in {} batches of up to {}",
            total, batches, self.batch_size
        );
        notify(ScanProgress::Started { total, batches });

        let start = Instant::now();
        let mut report = ScanReport {
            listed: total,
            analyzed: Vec::with_capacity(total),
            skipped: Vec::new(),
        };

        for (index, batch) in assets.chunks(self.batch_size).enumerate() {
            if cancel.load(Ordering::SeqCst) {
                info!("Scan cancelled before batch {}/{}", index + 1, batches);
                return Err(Error::Cancelled);
            }

            let batch_start = Instant::now();
            let mut outcomes = self.run_batch(gallery, batch, extractor);

            let mut batch_skipped = 0;
            for asset in batch {
                let outcome = outcomes.remove(&asset.id).unwrap_or_else(|| {
                    Err(SkipReason::Panic("worker produced no result".to_string()))
                });
                match outcome {
                    Ok(features) => report.analyzed.push((asset.clone(), features)),
                    Err(reason) => {
                        log_skip(&asset.id, &reason);
                        batch_skipped += 1;
                        report.skipped.push(SkipRecord {
                            id: asset.id.clone(),
                            reason,
                        });
                    }
                }
            }

            info!(
                "Batch {}/{} complete: {} ok, {} skipped in {:.2?}",
                index + 1,
                batches,
                batch.len() - batch_skipped,
                batch_skipped,
                batch_start.elapsed()
            );

            notify(ScanProgress::BatchComplete {
                batch: index + 1,
                batches,
                processed: report.analyzed.len() + report.skipped.len(),
                skipped: report.skipped.len(),
            });
        }

        info!(
            "Scan finished: {} analyzed, {} skipped in {:.2?}",
            report.analyzed.len(),
            report.skipped.len(),
            start.elapsed()
        );
        notify(ScanProgress::Finished {
            analyzed: report.analyzed.len(),
            skipped: report.skipped.len(),
        });

        Ok(report)
    }

    /// Fan one batch out over the pool; blocks until every task has reported
    fn run_batch<G, F, A>(
        &self,
        gallery: &G,
        batch: &[PhotoAsset],
        extractor: &FeatureExtractor<F, A>,
    ) -> HashMap<AssetId, ExtractOutcome>
    where
        G: Gallery + ?Sized,
        F: FaceCounter,
        A: AestheticScorer,
    {
        let (tx, rx) = channel::unbounded();

        self.pool.scope(|scope| {
            for asset in batch {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = analyze_asset(gallery, &asset.id, extractor);
                    // The receiver outlives the scope
                    let _ = tx.send((asset.id.clone(), outcome));
                });
            }
        });
        drop(tx);

        rx.into_iter().collect()
    }
}

/// Fetch and extract one asset; any panic on the way becomes a skip
fn analyze_asset<G, F, A>(
    gallery: &G,
    id: &AssetId,
    extractor: &FeatureExtractor<F, A>,
) -> ExtractOutcome
where
    G: Gallery + ?Sized,
    F: FaceCounter,
    A: AestheticScorer,
{
    let start = Instant::now();

    let result = panic::catch_unwind(AssertUnwindSafe(|| -> ExtractOutcome {
        let bytes = gallery.fetch_bytes(id)?;
        Ok(extractor.extract(&bytes)?)
    }));

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(panic_err) => Err(SkipReason::Panic(extract_panic_info(panic_err))),
    };

    debug!("Analyzed {} in {:.2?}", id, start.elapsed());
    outcome
}

/// Extract panic info from panic value
fn extract_panic_info(panic_err: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_err.downcast_ref::<&str>() {
        format!("Panic with message: {}", s)
    } else if let Some(s) = panic_err.downcast_ref::<String>() {
        format!("Panic with message: {}", s)
    } else {
        "Unknown panic occurred".to_string()
    }
}

/// Drop repeated ids, keeping the first occurrence
fn dedupe_assets(assets: Vec<PhotoAsset>) -> Vec<PhotoAsset> {
    let mut seen = HashSet::with_capacity(assets.len());
    let mut unique = Vec::with_capacity(assets.len());
    for asset in assets {
        if seen.insert(asset.id.clone()) {
            unique.push(asset);
        } else {
            warn!("Duplicate asset id in listing, ignoring repeat: {}", asset.id);
        }
    }
    unique
}
