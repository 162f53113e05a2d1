use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::core::similarity::cosine_similarity;

/// Square size images are cover-fitted to before binning
pub const HISTOGRAM_SIZE: u32 = 64;

/// Bins per color channel
pub const HISTOGRAM_BINS: usize = 32;

/// Per-channel color distribution of an image.
///
/// Each channel is normalized by pixel count, so it sums to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorHistogram {
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
    pub width: u32,
    pub height: u32,
}

impl ColorHistogram {
    pub fn from_image(img: &DynamicImage) -> Self {
        let resized = cover_fit(img, HISTOGRAM_SIZE);
        let (width, height) = resized.dimensions();
        let rgb = resized.to_rgb8();

        let mut red = vec![0.0; HISTOGRAM_BINS];
        let mut green = vec![0.0; HISTOGRAM_BINS];
        let mut blue = vec![0.0; HISTOGRAM_BINS];

        for pixel in rgb.pixels() {
            let [r, g, b] = pixel.0;
            red[bin(r)] += 1.0;
            green[bin(g)] += 1.0;
            blue[bin(b)] += 1.0;
        }

        let total_pixels = f64::from(width) * f64::from(height);
        if total_pixels > 0.0 {
            for channel in [&mut red, &mut green, &mut blue] {
                channel.iter_mut().for_each(|count| *count /= total_pixels);
            }
        }

        Self {
            red,
            green,
            blue,
            width,
            height,
        }
    }

    /// Mean of the three per-channel cosine similarities
    pub fn similarity(&self, other: &ColorHistogram) -> f64 {
        let r = cosine_similarity(&self.red, &other.red);
        let g = cosine_similarity(&self.green, &other.green);
        let b = cosine_similarity(&self.blue, &other.blue);
        (r + g + b) / 3.0
    }
}

/// `floor(value / 256 * bins)`
#[inline]
fn bin(value: u8) -> usize {
    usize::from(value) * HISTOGRAM_BINS / 256
}

/// Center-crop resize to a `size` square. Images smaller than the target on
/// either side are left as they are.
fn cover_fit(img: &DynamicImage, size: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width < size || height < size {
        return img.clone();
    }
    img.resize_to_fill(size, size, FilterType::Triangle)
}
