//! Synthetic images and feature sets for unit tests.
use std::io::Cursor;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use crate::processing::{compute_digest, ContentDigest, FeatureSet, Fingerprint};
use crate::types::{PhotoAsset, ScoredPhoto};

/// Encode an image as PNG bytes
pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png)
        .expect("PNG encoding of an in-memory image");
    buf.into_inner()
}

/// Smooth diagonal colour gradient
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    }))
}

/// Single colour
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// Deterministic pseudo-random texture (LCG), different per seed
pub fn noise_image(width: u32, height: u32, seed: u64) -> DynamicImage {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let v = (state >> 56) as u8;
        Rgb([v, v, v])
    }))
}

/// Timestamp `secs` seconds after a fixed epoch
pub fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// A feature set with healthy, neutral metrics; tweak fields as needed
pub fn healthy_features(seed: u8) -> FeatureSet {
    FeatureSet {
        digest: compute_digest(&[seed, 0xA5, seed]),
        fingerprint: Fingerprint(0),
        blur: 500.0,
        luminance: 128.0,
        entropy: 7.0,
        edge_density: 0.1,
        face_count: 1,
        aesthetic: 0.5,
        width: 4000,
        height: 3000,
    }
}

pub fn digest_of(label: &str) -> ContentDigest {
    compute_digest(label.as_bytes())
}

/// Fingerprint derived from a label's digest. Two different labels land
/// around 32 bits apart, far outside any near-duplicate threshold.
pub fn random_fingerprint(label: &str) -> Fingerprint {
    let digest = digest_of(label);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    Fingerprint(u64::from_le_bytes(bytes))
}

/// A scored photo with the given id, timestamp offset, features and score
pub fn scored(id: &str, secs: i64, features: FeatureSet, score: f64) -> ScoredPhoto {
    ScoredPhoto {
        asset: PhotoAsset::new(id, timestamp(secs)),
        features: Arc::new(features),
        score,
    }
}
