//! Image content comparison: color histograms plus edge-map correlation.
//!
//! Stands in for visual object recognition. Two photos of the same object
//! under similar lighting score high; unrelated photos score low.

pub mod histogram;
pub mod resolve;
pub mod structure;

use image::{ImageReader, Limits};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::MatchError;
use crate::services::FeatureCache;

pub use histogram::ColorHistogram;
pub use resolve::{resolve_image_ref, ImageRoots};
pub use structure::EdgeMap;

/// Share of the image score carried by the color histograms
pub const HISTOGRAM_WEIGHT: f64 = 0.7;

/// Share of the image score carried by edge correlation
pub const STRUCTURAL_WEIGHT: f64 = 0.3;

/// Decoded images wider or taller than this are rejected
const MAX_DIMENSION: u32 = 12_000;

/// Decoder allocation ceiling
const MAX_ALLOC_BYTES: u64 = 256 * 1024 * 1024;

/// Everything the engine keeps from one decoded image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFeatures {
    pub histogram: ColorHistogram,
    pub edges: EdgeMap,
}

impl ImageFeatures {
    pub fn from_image(img: &image::DynamicImage) -> Self {
        Self {
            histogram: ColorHistogram::from_image(img),
            edges: EdgeMap::from_image(img),
        }
    }

    /// Decode `path` once and derive both feature kinds from it
    pub fn load(path: &Path) -> Result<Self, MatchError> {
        if !path.is_file() {
            return Err(MatchError::unreadable(path, "file not found"));
        }

        let mut limits = Limits::default();
        limits.max_image_width = Some(MAX_DIMENSION);
        limits.max_image_height = Some(MAX_DIMENSION);
        limits.max_alloc = Some(MAX_ALLOC_BYTES);

        let mut reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| MatchError::unreadable(path, e))?;
        reader.limits(limits);
        let img = reader.decode().map_err(|e| MatchError::unreadable(path, e))?;

        Ok(Self::from_image(&img))
    }
}

/// Image similarity of one pair and its two components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageComparison {
    /// Mean per-channel histogram cosine similarity
    pub histogram: f64,
    /// Edge-map correlation score
    pub structural: f64,
    /// `0.7 * histogram + 0.3 * structural`, clamped to [0, 1]
    pub similarity: f64,
}

impl ImageComparison {
    pub fn between(a: &ImageFeatures, b: &ImageFeatures) -> Self {
        let histogram = a.histogram.similarity(&b.histogram);
        let structural = a.edges.similarity(&b.edges);
        Self {
            histogram,
            structural,
            similarity: (HISTOGRAM_WEIGHT * histogram + STRUCTURAL_WEIGHT * structural).clamp(0.0, 1.0),
        }
    }
}

/// Resolves image references and compares the images behind them
pub struct ImageMatcher {
    roots: ImageRoots,
    cache: Arc<FeatureCache>,
}

impl ImageMatcher {
    pub fn new(roots: ImageRoots, cache: Arc<FeatureCache>) -> Self {
        Self { roots, cache }
    }

    pub fn roots(&self) -> &ImageRoots {
        &self.roots
    }

    /// Compare the images behind two references.
    ///
    /// Fails with `UnresolvableImage` or `UnreadableImage`; callers treat
    /// either as zero similarity.
    pub fn compare(&self, reference_a: &str, reference_b: &str) -> Result<ImageComparison, MatchError> {
        let a = self.features(reference_a)?;
        let b = self.features(reference_b)?;
        Ok(ImageComparison::between(&a, &b))
    }

    fn features(&self, reference: &str) -> Result<Arc<ImageFeatures>, MatchError> {
        let path = resolve_image_ref(reference, &self.roots)
            .ok_or_else(|| MatchError::UnresolvableImage(reference.to_string()))?;
        self.cache.get_or_load(&path)
    }
}
