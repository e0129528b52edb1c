// Core modules
mod crypto_hash;
pub mod perceptual;
pub mod types;

// Per-photo analysis
pub mod extractor;
pub mod metrics;
pub mod scorers;

// Whole-gallery scheduling
pub mod batch_processor;
pub mod progress;

// Expose cryptographic digest
pub use crypto_hash::{compute_digest, ContentDigest, DIGEST_LEN};

// Expose perceptual fingerprint
pub use perceptual::{compute_fingerprint, Fingerprint, FINGERPRINT_BITS};

// Reexport core functionality
pub use batch_processor::{BatchScheduler, ScanReport};
pub use extractor::FeatureExtractor;
pub use progress::{ProgressTracker, ScanProgress};
pub use scorers::{AestheticScorer, FaceCounter, NeutralAesthetic, NoFaceDetection};
pub use types::{ExtractOutcome, FeatureSet};
