use image::{DynamicImage, ImageOutputFormat, Luma, Rgb, RgbImage};
use once_cell::sync::Lazy;
use std::io::Cursor;

/// Number of distinct textured photos in the fixture set
pub const TEXTURED_COUNT: usize = 32;

/// Encoded photos synthesised once per test binary
pub struct FixtureSet {
    /// Distinct noisy textures, pairwise far apart perceptually
    textured: Vec<Vec<u8>>,
    /// Smooth colour gradient (no detail, blurry by any measure)
    pub gradient: Vec<u8>,
    /// The gradient downscaled: different bytes, same picture
    pub gradient_small: Vec<u8>,
    /// Almost black, single level
    pub dark_flat: Vec<u8>,
    /// High-contrast black/white grid, like a scanned page
    pub document: Vec<u8>,
}

/// Global fixture set that's initialized once
#[allow(dead_code)]
pub static FIXTURES: Lazy<FixtureSet> = Lazy::new(FixtureSet::new);

impl FixtureSet {
    fn new() -> Self {
        let gradient = gradient_image(256, 192);
        let gradient_small =
            gradient.resize_exact(128, 96, image::imageops::FilterType::Triangle);

        Self {
            textured: (0..TEXTURED_COUNT)
                .map(|i| encode_png(&noise_image(48, 48, i as u64 + 1)))
                .collect(),
            gradient: encode_png(&gradient),
            gradient_small: encode_png(&gradient_small),
            dark_flat: encode_png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
                64,
                64,
                Rgb([8, 8, 8]),
            ))),
            document: encode_png(&DynamicImage::ImageLuma8(image::GrayImage::from_fn(
                256,
                256,
                |x, y| {
                    if (x / 4 + y / 4) % 2 == 0 {
                        Luma([255])
                    } else {
                        Luma([0])
                    }
                },
            ))),
        }
    }

    #[allow(dead_code)]
    pub fn textured(&self, index: usize) -> &[u8] {
        &self.textured[index % TEXTURED_COUNT]
    }
}

pub fn encode_png(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png)
        .expect("PNG encoding of an in-memory image");
    buf.into_inner()
}

pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    }))
}

/// Deterministic pseudo-random texture, different per seed
pub fn noise_image(width: u32, height: u32, seed: u64) -> DynamicImage {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let v = (state >> 56) as u8;
        Rgb([v, v / 2 + 64, 255 - v])
    }))
}
