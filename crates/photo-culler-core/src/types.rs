use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SkipReason;
use crate::processing::FeatureSet;

/// Opaque, stable identifier of a photo owned by the gallery
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A photo as reported by the gallery: identifier plus creation timestamp.
/// The raw bytes stay with the gallery and are fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAsset {
    pub id: AssetId,
    pub created_at: DateTime<Utc>,
}

impl PhotoAsset {
    pub fn new(id: impl Into<AssetId>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
        }
    }
}

/// An analyzed photo with its derived badness score (0 = keep, 100 = delete)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPhoto {
    pub asset: PhotoAsset,
    pub features: Arc<FeatureSet>,
    pub score: f64,
}

impl ScoredPhoto {
    pub fn id(&self) -> &AssetId {
        &self.asset.id
    }

    /// Same photo and features with a different derived score
    pub fn with_score(&self, score: f64) -> Self {
        Self {
            asset: self.asset.clone(),
            features: Arc::clone(&self.features),
            score,
        }
    }
}

/// Why a photo was surfaced as a deletion candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionReason {
    /// Byte-identical to an earlier photo that is being kept
    ExactDuplicate { of: AssetId },

    /// Visually near-identical to a better-scoring photo
    NearDuplicate { of: AssetId, distance: u32 },

    /// Surfaced on its own score
    LowQuality,
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactDuplicate { of } => write!(f, "exact duplicate of {}", of),
            Self::NearDuplicate { of, distance } => {
                write!(f, "near duplicate of {} ({} bits)", of, distance)
            }
            Self::LowQuality => f.write_str("low quality"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPhoto {
    pub photo: ScoredPhoto,
    pub reason: SelectionReason,
}

/// Up to K candidates, descending by score
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionResult {
    pub photos: Vec<SelectedPhoto>,
}

impl SelectionResult {
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn ids(&self) -> Vec<AssetId> {
        self.photos.iter().map(|p| p.photo.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedPhoto> {
        self.photos.iter()
    }
}

/// An asset that did not make it into the photo table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRecord {
    pub id: AssetId,
    pub reason: SkipReason,
}

/// Outcome of a completed scan
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Distinct assets reported by the gallery
    pub listed: usize,
    /// Assets that made it into the photo table
    pub analyzed: usize,
    pub skipped: Vec<SkipRecord>,
    pub elapsed: Duration,
}

/// Device storage as reported by the storage collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageUsage {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl StorageUsage {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    pub fn used_fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.used_bytes() as f64 / self.total_bytes as f64
        }
    }
}
