use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Largest number of extractions dispatched together in one batch
pub const MAX_BATCH_SIZE: usize = 256;

/// Smallest reduced buffer the heuristics can work on
pub const MIN_REDUCED_SIZE: u32 = 16;

/// Largest reduced buffer; bigger ones only cost memory per extraction
pub const MAX_REDUCED_SIZE: u32 = 1024;

/// Configuration for a culling session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of worker threads for feature extraction (0 = auto)
    pub threads: usize,

    /// Number of assets dispatched per batch
    pub batch_size: usize,

    /// Side of the square grayscale buffer all heuristics run on
    pub reduced_size: u32,

    /// Sobel magnitude above which a pixel counts as an edge
    pub edge_threshold: f64,

    /// Default number of candidates returned per selection
    pub selection_size: usize,

    /// Whether a completed scan also forgets previously surfaced photos
    pub reset_seen_on_scan: bool,

    /// Maximum directory depth when the gallery is a directory
    pub max_depth: Option<usize>,

    /// Where deleted files are moved instead of being removed
    pub trash_dir: Option<PathBuf>,

    /// Log level
    pub log_level: LogLevel,

    /// Penalty thresholds for the scoring engine
    pub scoring: ScoringConfig,

    /// Duplicate detection tunables
    pub clustering: ClusterConfig,
}

/// Thresholds and penalties of the badness score.
///
/// Every rule contributes independently; the sum is clamped to [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Laplacian variance below which a photo is considered blurry
    pub blur_threshold: f64,
    pub blur_penalty: f64,

    /// Mean luminance below which a photo is considered dark
    pub dark_luminance: f64,

    /// Histogram entropy (bits) below which a photo is considered low-detail
    pub low_entropy: f64,

    /// Dark and low-detail at the same time
    pub dark_low_detail_penalty: f64,

    /// Dark but still detailed
    pub dark_penalty: f64,

    /// Edge density above which a photo looks like a document or screenshot
    pub document_edge_density: f64,
    pub document_penalty: f64,

    /// No faces and low detail
    pub faceless_low_detail_penalty: f64,

    /// Points per unit of aesthetic quality away from neutral (0.5)
    pub aesthetic_weight: f64,
}

/// Exact and near-duplicate detection tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Fingerprints closer than this many bits are near duplicates
    pub similarity_threshold: u32,

    /// Score assigned to every exact duplicate that is not kept
    pub duplicate_score: f64,
}

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0, // Auto
            batch_size: 32,
            reduced_size: 128,
            edge_threshold: 100.0,
            selection_size: 9,
            reset_seen_on_scan: false,
            max_depth: None,
            trash_dir: None,
            log_level: LogLevel::Info,
            scoring: ScoringConfig::default(),
            clustering: ClusterConfig::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            blur_threshold: 100.0,
            blur_penalty: 40.0,
            dark_luminance: 40.0,
            low_entropy: 4.0,
            dark_low_detail_penalty: 35.0,
            dark_penalty: 15.0,
            document_edge_density: 0.25,
            document_penalty: 25.0,
            faceless_low_detail_penalty: 15.0,
            aesthetic_weight: 40.0,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 10,
            duplicate_score: 100.0,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Worker count with the auto setting resolved
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.threads
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(Error::Configuration(format!(
                "Batch size must be between 1 and {}",
                MAX_BATCH_SIZE
            )));
        }

        if !(MIN_REDUCED_SIZE..=MAX_REDUCED_SIZE).contains(&self.reduced_size) {
            return Err(Error::Configuration(format!(
                "Reduced size must be between {} and {}",
                MIN_REDUCED_SIZE, MAX_REDUCED_SIZE
            )));
        }

        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            return Err(Error::Configuration(
                "Edge threshold must be a non-negative number".to_string(),
            ));
        }

        if self.selection_size == 0 {
            return Err(Error::Configuration(
                "Selection size must be at least 1".to_string(),
            ));
        }

        self.scoring.validate()?;
        self.clustering.validate()?;

        Ok(())
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<()> {
        let values = [
            ("blur_threshold", self.blur_threshold),
            ("blur_penalty", self.blur_penalty),
            ("dark_luminance", self.dark_luminance),
            ("low_entropy", self.low_entropy),
            ("dark_low_detail_penalty", self.dark_low_detail_penalty),
            ("dark_penalty", self.dark_penalty),
            ("document_edge_density", self.document_edge_density),
            ("document_penalty", self.document_penalty),
            ("faceless_low_detail_penalty", self.faceless_low_detail_penalty),
            ("aesthetic_weight", self.aesthetic_weight),
        ];

        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Configuration(format!(
                    "Scoring parameter {} must be a non-negative number",
                    name
                )));
            }
        }

        Ok(())
    }
}

impl ClusterConfig {
    fn validate(&self) -> Result<()> {
        if self.similarity_threshold > crate::processing::FINGERPRINT_BITS {
            return Err(Error::Configuration(format!(
                "Similarity threshold cannot exceed {} bits",
                crate::processing::FINGERPRINT_BITS
            )));
        }

        if !(0.0..=100.0).contains(&self.duplicate_score) {
            return Err(Error::Configuration(
                "Duplicate score must be between 0 and 100".to_string(),
            ));
        }

        Ok(())
    }
}
