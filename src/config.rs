use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::core::{CompositeScorer, ImageMatcher, ImageRoots, Matcher};
use crate::models::ScoringWeights;
use crate::services::FeatureCache;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub images: ImageSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Minimum combined score for a pair to become a match
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Pairs scored concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_pair_timeout_ms")]
    pub pair_timeout_ms: u64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            workers: default_workers(),
            pair_timeout_ms: default_pair_timeout_ms(),
        }
    }
}

fn default_threshold() -> f64 { 0.25 }
fn default_workers() -> usize { 4 }
fn default_pair_timeout_ms() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSettings {
    /// Directory image references resolve against
    #[serde(default = "default_upload_root")]
    pub upload_root: PathBuf,
    /// Sub-folder of the root holding bare filenames
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// URL prefixes that point at the upload root
    #[serde(default = "default_host_prefixes")]
    pub host_prefixes: Vec<String>,
    #[serde(default = "default_feature_cache_size")]
    pub feature_cache_size: u64,
    #[serde(default = "default_feature_cache_ttl_secs")]
    pub feature_cache_ttl_secs: u64,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
            uploads_dir: default_uploads_dir(),
            host_prefixes: default_host_prefixes(),
            feature_cache_size: default_feature_cache_size(),
            feature_cache_ttl_secs: default_feature_cache_ttl_secs(),
        }
    }
}

fn default_upload_root() -> PathBuf { PathBuf::from(".") }
fn default_uploads_dir() -> String { "uploads".to_string() }
fn default_host_prefixes() -> Vec<String> {
    vec![
        "http://localhost:3001".to_string(),
        "https://localhost:3001".to_string(),
    ]
}
fn default_feature_cache_size() -> u64 { 1000 }
fn default_feature_cache_ttl_secs() -> u64 { 300 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights_with_image: WeightsWithImage,
    #[serde(default)]
    pub weights_without_image: WeightsWithoutImage,
}

/// Weight table used when both items carry an image
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(from = "WeightOverrides")]
pub struct WeightsWithImage(pub ScoringWeights);

impl From<WeightOverrides> for WeightsWithImage {
    fn from(overrides: WeightOverrides) -> Self {
        Self(overrides.over(ScoringWeights::with_image()))
    }
}

impl Default for WeightsWithImage {
    fn default() -> Self {
        Self(ScoringWeights::with_image())
    }
}

/// Weight table used otherwise
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(from = "WeightOverrides")]
pub struct WeightsWithoutImage(pub ScoringWeights);

impl From<WeightOverrides> for WeightsWithoutImage {
    fn from(overrides: WeightOverrides) -> Self {
        Self(overrides.over(ScoringWeights::without_image()))
    }
}

impl Default for WeightsWithoutImage {
    fn default() -> Self {
        Self(ScoringWeights::without_image())
    }
}

/// Weights set in a config layer; unset fields keep the table's nominal value
#[derive(Debug, Default, Deserialize)]
pub struct WeightOverrides {
    pub image: Option<f64>,
    pub text: Option<f64>,
    pub phrase: Option<f64>,
    pub color: Option<f64>,
    pub brand: Option<f64>,
    pub material: Option<f64>,
    pub condition: Option<f64>,
    pub entity: Option<f64>,
    pub sentiment: Option<f64>,
}

impl WeightOverrides {
    fn over(self, nominal: ScoringWeights) -> ScoringWeights {
        ScoringWeights {
            image: self.image.unwrap_or(nominal.image),
            text: self.text.unwrap_or(nominal.text),
            phrase: self.phrase.unwrap_or(nominal.phrase),
            color: self.color.unwrap_or(nominal.color),
            brand: self.brand.unwrap_or(nominal.brand),
            material: self.material.unwrap_or(nominal.material),
            condition: self.condition.unwrap_or(nominal.condition),
            entity: self.entity.unwrap_or(nominal.entity),
            sentiment: self.sentiment.unwrap_or(nominal.sentiment),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LOSTFOUND__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LOSTFOUND__MATCHING__THRESHOLD -> matching.threshold
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    pub fn image_roots(&self) -> ImageRoots {
        let mut roots = ImageRoots::new(&self.images.upload_root);
        roots.uploads_dir = self.images.uploads_dir.clone();
        roots.host_prefixes = self.images.host_prefixes.clone();
        roots
    }

    /// Assemble a matcher from these settings
    pub fn build_matcher(&self) -> Matcher {
        let cache = Arc::new(FeatureCache::new(
            self.images.feature_cache_size,
            self.images.feature_cache_ttl_secs,
        ));
        let scorer = CompositeScorer::with_weights(
            ImageMatcher::new(self.image_roots(), cache),
            self.scoring.weights_with_image.0,
            self.scoring.weights_without_image.0,
        );

        Matcher::new(scorer)
            .with_threshold(self.matching.threshold)
            .with_workers(self.matching.workers)
            .with_pair_timeout(Duration::from_millis(self.matching.pair_timeout_ms))
    }
}

fn environment() -> Environment {
    Environment::with_prefix("LOSTFOUND")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("images.host_prefixes")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let scoring = ScoringSettings::default();
        assert_eq!(scoring.weights_with_image.0.image, 0.25);
        assert_eq!(scoring.weights_without_image.0.text, 0.35);
        assert_eq!(scoring.weights_without_image.0.image, 0.0);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[matching]\nthreshold = 0.4\n\n[images]\nupload_root = \"/srv/lostfound\"\n\n[scoring.weights_without_image]\nimage = 0.0\ntext = 0.5\nphrase = 0.1\ncolor = 0.1\nbrand = 0.1\nmaterial = 0.1\ncondition = 0.05\nentity = 0.05\nsentiment = 0.0"
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.matching.threshold, 0.4);
        assert_eq!(settings.matching.workers, 4);
        assert_eq!(settings.images.upload_root, PathBuf::from("/srv/lostfound"));
        assert_eq!(settings.images.uploads_dir, "uploads");
        assert_eq!(settings.scoring.weights_without_image.0.text, 0.5);
        assert_eq!(settings.scoring.weights_with_image.0, ScoringWeights::with_image());

        let roots = settings.image_roots();
        assert_eq!(roots.upload_root, PathBuf::from("/srv/lostfound"));
        assert_eq!(roots.host_prefixes.len(), 2);
        assert_eq!(settings.build_matcher().threshold(), 0.4);
    }

    #[test]
    fn test_single_weight_override_keeps_other_nominal_weights() {
        // Same shape as LOSTFOUND__SCORING__WEIGHTS_WITH_IMAGE__TEXT=0.3 on its own
        let settings: Settings = Config::builder()
            .set_override("scoring.weights_with_image.text", 0.3)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let with_image = settings.scoring.weights_with_image.0;
        assert_eq!(with_image.text, 0.3);
        assert_eq!(with_image.image, 0.25);
        assert_eq!(with_image.phrase, 0.15);
        assert_eq!(with_image.sentiment, 0.01);
        assert_eq!(settings.scoring.weights_without_image.0, ScoringWeights::without_image());
    }
}
