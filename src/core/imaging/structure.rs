use image::{imageops::FilterType, DynamicImage, GrayImage};

/// Square size images are cover-fitted to before edge filtering
pub const EDGE_SIZE: u32 = 32;

/// 3x3 high-pass kernel: center +8, neighbors -1
const EDGE_KERNEL: [[f64; 3]; 3] = [[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]];

/// Edge response of a greyscale, intensity-normalized thumbnail.
///
/// Values are in [0, 1], row-major, `EDGE_SIZE * EDGE_SIZE` long.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    values: Vec<f64>,
}

impl EdgeMap {
    pub fn from_image(img: &DynamicImage) -> Self {
        let grey = img
            .resize_to_fill(EDGE_SIZE, EDGE_SIZE, FilterType::Triangle)
            .to_luma8();
        let stretched = stretch_contrast(&grey);
        Self {
            values: convolve(&stretched, grey.width() as usize, grey.height() as usize),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Pearson correlation mapped from [-1, 1] onto [0, 1].
    ///
    /// Returns 0 when either map is flat (zero standard deviation).
    pub fn similarity(&self, other: &EdgeMap) -> f64 {
        match pearson(&self.values, &other.values) {
            Some(r) => ((r + 1.0) / 2.0).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

/// Min-max stretch of luminance onto the full 0..=255 range
fn stretch_contrast(grey: &GrayImage) -> Vec<f64> {
    let raw: Vec<f64> = grey.pixels().map(|p| f64::from(p.0[0])).collect();
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 0.0 {
        return raw;
    }
    raw.into_iter().map(|v| (v - min) * 255.0 / range).collect()
}

/// Apply the edge kernel with clamped borders, clamp to 0..=255, scale to [0, 1]
fn convolve(pixels: &[f64], width: usize, height: usize) -> Vec<f64> {
    let at = |x: isize, y: isize| {
        let cx = x.clamp(0, width as isize - 1) as usize;
        let cy = y.clamp(0, height as isize - 1) as usize;
        pixels[cy * width + cx]
    };

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height as isize {
        for x in 0..width as isize {
            let mut acc = 0.0;
            for (ky, row) in EDGE_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    acc += weight * at(x + kx as isize - 1, y + ky as isize - 1);
                }
            }
            out.push(acc.round().clamp(0.0, 255.0) / 255.0);
        }
    }
    out
}

/// Pearson correlation, or `None` when lengths differ, input is empty, or
/// either side has no variance
fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    let std_a = (variance_a / n).sqrt();
    let std_b = (variance_b / n).sqrt();
    if std_a == 0.0 || std_b == 0.0 {
        return None;
    }
    Some((covariance / n) / (std_a * std_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn checkerboard(size: u32, cell: u32, invert: bool) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            let dark = ((x / cell) + (y / cell)) % 2 == 0;
            if dark != invert {
                Rgb([20, 20, 40])
            } else {
                Rgb([230, 220, 200])
            }
        }))
    }

    fn gradient(size: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            let v = ((x * 7 + y * 3) % 256) as u8;
            Rgb([v, v / 2, 255 - v])
        }))
    }

    #[test]
    fn test_self_similarity_is_one() {
        let edges = EdgeMap::from_image(&checkerboard(128, 16, false));
        assert_eq!(edges.values().len(), (EDGE_SIZE * EDGE_SIZE) as usize);
        assert!((edges.similarity(&edges) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_image_scores_zero() {
        let flat = EdgeMap::from_image(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
            64,
            64,
            Rgb([90, 90, 90]),
        )));
        let textured = EdgeMap::from_image(&checkerboard(128, 16, false));
        assert_eq!(flat.similarity(&textured), 0.0);
        assert_eq!(flat.similarity(&flat), 0.0);
    }

    #[test]
    fn test_similarity_is_bounded() {
        let a = EdgeMap::from_image(&checkerboard(128, 16, false));
        let b = EdgeMap::from_image(&checkerboard(128, 16, true));
        let c = EdgeMap::from_image(&gradient(100));
        for score in [a.similarity(&b), a.similarity(&c), c.similarity(&b)] {
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_pearson_edge_cases() {
        assert_eq!(pearson(&[], &[]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }
}
