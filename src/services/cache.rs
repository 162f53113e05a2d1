use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::core::imaging::ImageFeatures;
use crate::error::MatchError;

/// In-memory cache of decoded image features keyed by resolved path.
///
/// A new item is compared against every candidate, so without the cache its
/// own image would be decoded once per pair.
pub struct FeatureCache {
    inner: Cache<PathBuf, Arc<ImageFeatures>>,
}

impl FeatureCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { inner }
    }

    /// Cached features for `path`, decoding on a miss.
    ///
    /// Failed decodes are not cached.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<ImageFeatures>, MatchError> {
        self.inner
            .try_get_with(path.to_path_buf(), || ImageFeatures::load(path).map(Arc::new))
            .map_err(|shared| match Arc::try_unwrap(shared) {
                Ok(err) => err,
                Err(shared) => MatchError::unreadable(path, shared),
            })
    }

    pub fn invalidate(&self, path: &Path) {
        self.inner.invalidate(path);
        tracing::trace!("Feature cache invalidated: {}", path.display());
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entries: self.inner.entry_count(),
            capacity: self.inner.policy().max_capacity().unwrap_or(0),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub capacity: u64,
}
