//! Heuristic quality measures over the reduced grayscale buffer.
//!
//! Every function here is pure and total: degenerate buffers (empty, or too
//! small to have interior pixels) yield 0.0 instead of failing.

use image::GrayImage;

/// Variance of the 4-neighbour Laplacian response over interior pixels.
///
/// Kernel:
/// ```text
///  0 -1  0
/// -1  4 -1
///  0 -1  0
/// ```
/// Low variance means few or weak edges, which usually means a blurry photo.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| gray.get_pixel(x, y)[0] as f64;

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut count = 0u64;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let response = 4.0 * px(x, y) - px(x - 1, y) - px(x + 1, y) - px(x, y - 1) - px(x, y + 1);
            sum += response;
            sum_sq += response * response;
            count += 1;
        }
    }

    let n = count as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Mean intensity (0-255)
pub fn mean_luminance(gray: &GrayImage) -> f64 {
    let pixels = gray.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    pixels.iter().map(|&p| p as u64).sum::<u64>() as f64 / pixels.len() as f64
}

/// 256-bin intensity histogram
pub fn histogram(gray: &GrayImage) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for &p in gray.as_raw() {
        bins[p as usize] += 1;
    }
    bins
}

/// Shannon entropy (base 2) of the intensity histogram, in bits (0-8)
pub fn histogram_entropy(gray: &GrayImage) -> f64 {
    let bins = histogram(gray);
    let total: u64 = bins.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    bins.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum::<f64>()
        .max(0.0)
}

/// Fraction of interior pixels whose Sobel gradient magnitude exceeds `threshold`.
///
/// Documents, whiteboards and screenshots score unusually high.
pub fn edge_density(gray: &GrayImage, threshold: f64) -> f64 {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| gray.get_pixel(x, y)[0] as f64;

    let mut edges = 0u64;
    let mut count = 0u64;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = (px(x + 1, y - 1) + 2.0 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2.0 * px(x - 1, y) + px(x - 1, y + 1));
            let gy = (px(x - 1, y + 1) + 2.0 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2.0 * px(x, y - 1) + px(x + 1, y - 1));

            if (gx * gx + gy * gy).sqrt() > threshold {
                edges += 1;
            }
            count += 1;
        }
    }

    edges as f64 / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn checkerboard(size: u32, cell: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_flat_image_has_no_laplacian_variance() {
        let gray = GrayImage::from_pixel(32, 32, Luma([128]));
        assert_eq!(laplacian_variance(&gray), 0.0);
    }

    #[test]
    fn test_sharp_beats_smooth() {
        let sharp = checkerboard(64, 2);
        let smooth = GrayImage::from_fn(64, 64, |x, _| Luma([(x * 4) as u8]));
        assert!(laplacian_variance(&sharp) > laplacian_variance(&smooth));
        // A linear ramp has zero second derivative everywhere
        assert_eq!(laplacian_variance(&smooth), 0.0);
    }

    #[test]
    fn test_tiny_image_metrics_are_zero() {
        let gray = GrayImage::from_pixel(2, 2, Luma([10]));
        assert_eq!(laplacian_variance(&gray), 0.0);
        assert_eq!(edge_density(&gray, 100.0), 0.0);
    }

    #[test]
    fn test_mean_luminance() {
        let gray = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([0]) } else { Luma([255]) });
        assert_eq!(mean_luminance(&gray), 127.5);
        assert_eq!(mean_luminance(&GrayImage::new(0, 0)), 0.0);
    }

    #[test]
    fn test_entropy_of_flat_image_is_zero() {
        let gray = GrayImage::from_pixel(16, 16, Luma([42]));
        assert_eq!(histogram_entropy(&gray), 0.0);
    }

    #[test]
    fn test_entropy_of_two_levels_is_one_bit() {
        let gray = checkerboard(16, 1);
        assert!((histogram_entropy(&gray) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_of_uniform_histogram_is_eight_bits() {
        let gray = GrayImage::from_fn(256, 1, |x, _| Luma([x as u8]));
        assert!((histogram_entropy(&gray) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_edge_density_range() {
        let flat = GrayImage::from_pixel(32, 32, Luma([200]));
        assert_eq!(edge_density(&flat, 100.0), 0.0);

        let busy = checkerboard(32, 2);
        let density = edge_density(&busy, 100.0);
        assert!(density > 0.9 && density <= 1.0, "density was {}", density);
    }

    #[test]
    fn test_edge_density_single_boundary() {
        // One vertical step edge: only the two columns next to it respond
        let gray = GrayImage::from_fn(34, 34, |x, _| if x < 17 { Luma([0]) } else { Luma([255]) });
        let density = edge_density(&gray, 100.0);
        assert!((density - 2.0 / 32.0).abs() < 1e-12, "density was {}", density);
    }
}
