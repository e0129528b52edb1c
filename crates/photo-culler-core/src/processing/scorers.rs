//! Optional learned-model hooks.
//!
//! Face counting and aesthetic scoring are injected into the
//! [`FeatureExtractor`](super::extractor::FeatureExtractor) as type parameters
//! chosen at construction time. Both receive the full-resolution decoded image.
//! Returning `None` means "no opinion" and the extractor substitutes the
//! neutral default, so the pipeline works unchanged without any model.

use image::DynamicImage;

/// Face count used when no detector is available
pub const NEUTRAL_FACE_COUNT: u32 = 0;

/// Aesthetic quality used when no scorer is available
pub const NEUTRAL_AESTHETIC: f64 = 0.5;

/// Counts faces in a photo
pub trait FaceCounter: Send + Sync {
    fn count_faces(&self, image: &DynamicImage) -> Option<u32>;
}

/// Rates a photo's aesthetic quality in [0, 1]
pub trait AestheticScorer: Send + Sync {
    fn aesthetic_quality(&self, image: &DynamicImage) -> Option<f64>;
}

/// Default face counter: never detects anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetection;

impl FaceCounter for NoFaceDetection {
    fn count_faces(&self, _image: &DynamicImage) -> Option<u32> {
        None
    }
}

/// Default aesthetic scorer: always neutral
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralAesthetic;

impl AestheticScorer for NeutralAesthetic {
    fn aesthetic_quality(&self, _image: &DynamicImage) -> Option<f64> {
        None
    }
}

impl<F> FaceCounter for F
where
    F: Fn(&DynamicImage) -> Option<u32> + Send + Sync,
{
    fn count_faces(&self, image: &DynamicImage) -> Option<u32> {
        self(image)
    }
}

impl<F> AestheticScorer for F
where
    F: Fn(&DynamicImage) -> Option<f64> + Send + Sync,
{
    fn aesthetic_quality(&self, image: &DynamicImage) -> Option<f64> {
        self(image)
    }
}

/// Resolve a face counter's answer to a concrete value
pub(crate) fn resolve_face_count(raw: Option<u32>) -> u32 {
    raw.unwrap_or(NEUTRAL_FACE_COUNT)
}

/// Resolve an aesthetic scorer's answer to a value in [0, 1]
pub(crate) fn resolve_aesthetic(raw: Option<f64>) -> f64 {
    match raw {
        Some(q) if q.is_finite() => q.clamp(0.0, 1.0),
        _ => NEUTRAL_AESTHETIC,
    }
}
