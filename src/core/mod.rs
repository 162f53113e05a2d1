// Core algorithm exports
pub mod distance;
pub mod explanation;
pub mod features;
pub mod filters;
pub mod imaging;
pub mod legacy;
pub mod lexicon;
pub mod matcher;
pub mod scoring;
pub mod similarity;

pub use distance::{haversine_distance, item_distance_km, normalized_distance};
pub use explanation::build_explanation;
pub use features::{FeatureSet, TextFeatureExtractor};
pub use filters::is_candidate;
pub use imaging::{resolve_image_ref, ImageComparison, ImageMatcher, ImageRoots};
pub use legacy::classic_score;
pub use matcher::{orient, sort_for_display, MatchResult, Matcher, PairOutcome};
pub use scoring::CompositeScorer;
pub use similarity::{categorical_similarity, cosine_similarity, text_similarity};
