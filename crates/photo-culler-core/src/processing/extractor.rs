//! Single-photo feature extraction.
//!
//! Pipeline, with exactly one decode per asset:
//! 1. decode the encoded bytes at full resolution (failure stops here)
//! 2. digest the encoded bytes
//! 3. reduce to a small square grayscale buffer, once
//! 4. fingerprint, blur, luminance, entropy and edge density on that buffer
//! 5. optional face / aesthetic scorers on the full-resolution image

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};

use super::crypto_hash::compute_digest;
use super::metrics::{edge_density, histogram_entropy, laplacian_variance, mean_luminance};
use super::perceptual::compute_fingerprint;
use super::scorers::{
    resolve_aesthetic, resolve_face_count, AestheticScorer, FaceCounter, NeutralAesthetic,
    NoFaceDetection,
};
use super::types::FeatureSet;
use crate::config::Config;
use crate::error::ExtractError;

/// Decode encoded bytes, sniffing the format from its magic number
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ExtractError> {
    if bytes.is_empty() {
        return Err(ExtractError::Decode("empty input".to_string()));
    }

    let format = image::guess_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format)?;

    if img.width() == 0 || img.height() == 0 {
        return Err(ExtractError::Decode(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }

    Ok(img)
}

/// Downsample to `size`×`size` and convert to 8-bit grayscale
pub fn reduce(img: &DynamicImage, size: u32) -> GrayImage {
    img.resize_exact(size, size, FilterType::Triangle).to_luma8()
}

/// Turns encoded photos into [`FeatureSet`]s.
///
/// The face counter and aesthetic scorer are fixed at construction; the
/// defaults contribute neutral values.
pub struct FeatureExtractor<F = NoFaceDetection, A = NeutralAesthetic> {
    reduced_size: u32,
    edge_threshold: f64,
    face_counter: F,
    aesthetic_scorer: A,
}

impl FeatureExtractor {
    /// Extractor without learned-model scorers
    pub fn new(config: &Config) -> Self {
        Self::with_scorers(config, NoFaceDetection, NeutralAesthetic)
    }
}

impl<F: FaceCounter, A: AestheticScorer> FeatureExtractor<F, A> {
    pub fn with_scorers(config: &Config, face_counter: F, aesthetic_scorer: A) -> Self {
        Self {
            reduced_size: config.reduced_size,
            edge_threshold: config.edge_threshold,
            face_counter,
            aesthetic_scorer,
        }
    }

    /// Compute the feature set of one encoded photo
    pub fn extract(&self, bytes: &[u8]) -> Result<FeatureSet, ExtractError> {
        let img = decode(bytes)?;
        let digest = compute_digest(bytes);
        let gray = reduce(&img, self.reduced_size);

        let face_count = resolve_face_count(self.face_counter.count_faces(&img));
        let aesthetic = resolve_aesthetic(self.aesthetic_scorer.aesthetic_quality(&img));

        Ok(FeatureSet {
            digest,
            fingerprint: compute_fingerprint(&gray),
            blur: laplacian_variance(&gray),
            luminance: mean_luminance(&gray),
            entropy: histogram_entropy(&gray),
            edge_density: edge_density(&gray, self.edge_threshold),
            face_count,
            aesthetic,
            width: img.width(),
            height: img.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{encode_png, gradient_image, noise_image, solid_image};

    #[test]
    fn test_extract_png() {
        let bytes = encode_png(&gradient_image(96, 64));
        let features = FeatureExtractor::new(&Config::default()).extract(&bytes).unwrap();

        assert_eq!((features.width, features.height), (96, 64));
        assert_eq!(features.digest, compute_digest(&bytes));
        assert!(features.luminance > 0.0 && features.luminance < 255.0);
        assert!(features.entropy > 0.0 && features.entropy <= 8.0);
        assert!((0.0..=1.0).contains(&features.edge_density));
        assert_eq!(features.face_count, 0);
        assert_eq!(features.aesthetic, 0.5);
    }

    #[test]
    fn test_garbage_is_unsupported() {
        let result = FeatureExtractor::new(&Config::default()).extract(b"this is not a jpeg");
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        let result = FeatureExtractor::new(&Config::default()).extract(&[]);
        assert!(matches!(result, Err(ExtractError::Decode(_))));
    }

    #[test]
    fn test_truncated_png_is_decode_error() {
        let bytes = encode_png(&gradient_image(64, 64));
        let truncated = &bytes[..bytes.len() / 2];
        let result = FeatureExtractor::new(&Config::default()).extract(truncated);
        assert!(matches!(result, Err(ExtractError::Decode(_))));
    }

    #[test]
    fn test_flat_dark_image_metrics() {
        let bytes = encode_png(&solid_image(64, 64, [10, 10, 10]));
        let features = FeatureExtractor::new(&Config::default()).extract(&bytes).unwrap();

        assert_eq!(features.blur, 0.0);
        assert_eq!(features.entropy, 0.0);
        assert_eq!(features.edge_density, 0.0);
        assert!((features.luminance - 10.0).abs() < 1.0);
    }

    #[test]
    fn test_noise_is_sharper_than_flat() {
        let extractor = FeatureExtractor::new(&Config::default());
        let noisy = extractor.extract(&encode_png(&noise_image(128, 128, 7))).unwrap();
        let flat = extractor.extract(&encode_png(&solid_image(128, 128, [120, 120, 120]))).unwrap();
        assert!(noisy.blur > flat.blur);
        assert!(noisy.entropy > flat.entropy);
    }

    #[test]
    fn test_resized_copy_keeps_fingerprint_close() {
        let extractor = FeatureExtractor::new(&Config::default());
        let original = gradient_image(256, 192);
        let smaller = original.resize_exact(128, 96, FilterType::Triangle);

        let a = extractor.extract(&encode_png(&original)).unwrap();
        let b = extractor.extract(&encode_png(&smaller)).unwrap();

        assert_ne!(a.digest, b.digest);
        assert!(a.fingerprint.distance(&b.fingerprint) < 10);
    }

    #[test]
    fn test_injected_scorers_are_used() {
        let extractor = FeatureExtractor::with_scorers(
            &Config::default(),
            |_: &DynamicImage| Some(3u32),
            |img: &DynamicImage| Some(if img.width() >= 64 { 0.9 } else { 0.1 }),
        );
        let features = extractor.extract(&encode_png(&gradient_image(64, 64))).unwrap();
        assert_eq!(features.face_count, 3);
        assert_eq!(features.aesthetic, 0.9);
    }

    #[test]
    fn test_scorer_returning_none_is_neutral() {
        let extractor = FeatureExtractor::with_scorers(
            &Config::default(),
            |_: &DynamicImage| -> Option<u32> { None },
            |_: &DynamicImage| Some(f64::NAN),
        );
        let features = extractor.extract(&encode_png(&gradient_image(32, 32))).unwrap();
        assert_eq!(features.face_count, 0);
        assert_eq!(features.aesthetic, 0.5);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = FeatureExtractor::new(&Config::default());
        let bytes = encode_png(&noise_image(80, 80, 3));
        assert_eq!(extractor.extract(&bytes).unwrap(), extractor.extract(&bytes).unwrap());
    }
}
