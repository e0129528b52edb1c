//! # Perceptual Fingerprint Module
//!
//! Generates 64-bit "fingerprints" that stay similar for visually similar
//! photos, unlike the content digest where any re-encode changes the output.
//!
//! ## Method
//!
//! The reduced grayscale buffer is split into an 8×8 grid of cells. Each cell
//! is averaged, the mean over all 64 cells is computed, and bit *i* is set when
//! cell *i* is at or above that mean (row-major, bit 0 = top-left cell).
//! Because only the *relative* structure is encoded, resizing, mild
//! recompression and uniform brightness shifts leave most bits unchanged.
//!
//! ## Hamming Distance Interpretation
//!
//! - 0-3: Nearly identical photos (same shot, re-encoded or resized)
//! - 4-10: Similar photos (burst shots, small reframes)
//! - >10: Different photos

use image::GrayImage;
use serde::Serialize;
use std::fmt;

/// Cells per side of the fingerprint grid
pub const FINGERPRINT_GRID: u32 = 8;

/// Width of a fingerprint in bits
pub const FINGERPRINT_BITS: u32 = FINGERPRINT_GRID * FINGERPRINT_GRID;

/// A perceptual fingerprint represented as a 64-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// Calculate the Hamming distance between two fingerprints
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Whether two fingerprints differ in fewer than `threshold` bits
    pub fn is_similar(&self, other: &Fingerprint, threshold: u32) -> bool {
        self.distance(other) < threshold
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Average the buffer over an 8×8 grid. Cell edges are placed proportionally so
/// sides that are not a multiple of 8 still cover every pixel exactly once.
fn cell_means(gray: &GrayImage) -> [f64; FINGERPRINT_BITS as usize] {
    let (width, height) = gray.dimensions();
    let mut cells = [0.0; FINGERPRINT_BITS as usize];

    // Edges computed in u64 so very large buffers cannot overflow
    let edge = |i: u32, side: u32| (i as u64 * side as u64 / FINGERPRINT_GRID as u64) as u32;

    for row in 0..FINGERPRINT_GRID {
        let y0 = edge(row, height);
        let y1 = edge(row + 1, height).max(y0 + 1).min(height);

        for col in 0..FINGERPRINT_GRID {
            let x0 = edge(col, width);
            let x1 = edge(col + 1, width).max(x0 + 1).min(width);

            let mut sum = 0u64;
            let mut count = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += gray.get_pixel(x, y)[0] as u64;
                    count += 1;
                }
            }

            cells[(row * FINGERPRINT_GRID + col) as usize] = if count > 0 {
                sum as f64 / count as f64
            } else {
                0.0
            };
        }
    }

    cells
}

/// Compute the fingerprint of a reduced grayscale buffer.
///
/// An empty buffer yields the all-zero fingerprint.
pub fn compute_fingerprint(gray: &GrayImage) -> Fingerprint {
    if gray.width() == 0 || gray.height() == 0 {
        return Fingerprint(0);
    }

    let cells = cell_means(gray);
    let mean = cells.iter().sum::<f64>() / cells.len() as f64;

    let mut hash: u64 = 0;
    for (bit_pos, &value) in cells.iter().enumerate() {
        if value >= mean {
            hash |= 1u64 << bit_pos;
        }
    }

    Fingerprint(hash)
}
