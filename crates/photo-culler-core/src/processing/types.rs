use serde::Serialize;

use super::crypto_hash::ContentDigest;
use super::perceptual::Fingerprint;
use crate::error::SkipReason;

/// Everything the engine knows about one photo's content.
///
/// Computed once per asset by the feature extractor and shared behind an
/// `Arc` afterwards; scoring derives new values from it, never edits it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    /// BLAKE3 digest of the encoded bytes
    pub digest: ContentDigest,
    /// 8x8 average-hash fingerprint of the reduced buffer
    pub fingerprint: Fingerprint,
    /// Laplacian variance (>= 0); low means blurry
    pub blur: f64,
    /// Mean intensity (0-255)
    pub luminance: f64,
    /// Histogram entropy in bits (0-8)
    pub entropy: f64,
    /// Fraction of edge pixels (0-1)
    pub edge_density: f64,
    /// Faces found by the face counter (0 when none is installed)
    pub face_count: u32,
    /// Aesthetic quality in [0, 1] (0.5 when no scorer is installed)
    pub aesthetic: f64,
    /// Decoded dimensions
    pub width: u32,
    pub height: u32,
}

/// Per-asset result of a scan: features, or the reason the asset was skipped
pub type ExtractOutcome = Result<FeatureSet, SkipReason>;
