use tracing::{debug, warn};

use crate::core::explanation::build_explanation;
use crate::core::features::{FeatureSet, TextFeatureExtractor};
use crate::core::imaging::ImageMatcher;
use crate::core::legacy::classic_score;
use crate::core::lexicon::Attribute;
use crate::core::similarity::{categorical_similarity, sentiment_similarity, text_similarity};
use crate::models::{Item, ScoreResult, ScoringWeights, Signal, SignalScore};

/// Categorical signals in weighting order, paired with the attribute they read
const CATEGORICAL_SIGNALS: [(Signal, Attribute); 5] = [
    (Signal::Phrase, Attribute::KeyPhrase),
    (Signal::Color, Attribute::Color),
    (Signal::Brand, Attribute::Brand),
    (Signal::Material, Attribute::Material),
    (Signal::Condition, Attribute::Condition),
];

/// Combines every sub-score of a (lost, found) pair into one score in [0, 1]
///
/// Scoring formula:
/// score = Σ wᵢ·sᵢ / Σ wᵢ over the signals that apply to the pair
///
/// A signal applies when it carries information about the pair:
/// - text: always (0 when either description is empty)
/// - phrase/color/brand/material/condition/entity: at least one side has a value
/// - sentiment: both descriptions present and at least one is not neutral
/// - image: both items carry an image reference
///
/// The weight table is picked by whether the image signal applies.
pub struct CompositeScorer {
    extractor: TextFeatureExtractor,
    images: ImageMatcher,
    weights_with_image: ScoringWeights,
    weights_without_image: ScoringWeights,
}

impl CompositeScorer {
    pub fn new(images: ImageMatcher) -> Self {
        Self::with_weights(images, ScoringWeights::with_image(), ScoringWeights::without_image())
    }

    pub fn with_weights(
        images: ImageMatcher,
        weights_with_image: ScoringWeights,
        weights_without_image: ScoringWeights,
    ) -> Self {
        Self {
            extractor: TextFeatureExtractor::new(),
            images,
            weights_with_image,
            weights_without_image,
        }
    }

    pub fn extractor(&self) -> &TextFeatureExtractor {
        &self.extractor
    }

    pub fn images(&self) -> &ImageMatcher {
        &self.images
    }

    /// Score one pair. Never fails: per-signal problems degrade that signal.
    pub fn score(&self, lost: &Item, found: &Item) -> ScoreResult {
        let lost_features = self.extractor.extract(&lost.description);
        let found_features = self.extractor.extract(&found.description);

        let image_similarity = self.image_similarity(lost, found);
        let weights = if image_similarity.is_some() {
            &self.weights_with_image
        } else {
            &self.weights_without_image
        };

        let mut signals = Vec::with_capacity(9);
        let mut apply = |signal: Signal, score: f64| {
            let weight = weights.weight(signal);
            if weight > 0.0 {
                signals.push(SignalScore { signal, score, weight });
            }
        };

        if let Some(similarity) = image_similarity {
            apply(Signal::Image, similarity);
        }

        apply(Signal::Text, text_similarity(&lost.description, &found.description));

        for (signal, attribute) in CATEGORICAL_SIGNALS {
            let (a, b) = (lost_features.attribute(attribute), found_features.attribute(attribute));
            if !a.is_empty() || !b.is_empty() {
                apply(signal, categorical_similarity(a, b));
            }
        }

        if !lost_features.entities.is_empty() || !found_features.entities.is_empty() {
            apply(
                Signal::Entity,
                categorical_similarity(&lost_features.entities, &found_features.entities),
            );
        }

        if let Some(similarity) = sentiment_signal(&lost_features, &found_features) {
            apply(Signal::Sentiment, similarity);
        }

        let score = combine(&signals);
        debug!(
            "Scored pair ({}, {}): {:.3} over {} signals",
            lost.id,
            found.id,
            score,
            signals.len()
        );

        ScoreResult {
            score,
            image_similarity,
            legacy_score: classic_score(lost, found),
            explanation: build_explanation(
                lost,
                found,
                &lost_features,
                &found_features,
                score,
                image_similarity,
            ),
            signals,
        }
    }

    /// Image similarity when both items carry an image.
    ///
    /// A reference that cannot be resolved or decoded counts as 0.
    fn image_similarity(&self, lost: &Item, found: &Item) -> Option<f64> {
        let (lost_ref, found_ref) = (lost.image()?, found.image()?);
        match self.images.compare(lost_ref, found_ref) {
            Ok(comparison) => Some(comparison.similarity),
            Err(e) => {
                warn!(
                    "Image comparison failed for pair ({}, {}), scoring image as 0: {}",
                    lost.id, found.id, e
                );
                Some(0.0)
            }
        }
    }
}

/// Sentiment agreement, when both sides have text and at least one is not neutral
fn sentiment_signal(lost: &FeatureSet, found: &FeatureSet) -> Option<f64> {
    let (a, b) = (lost.sentiment()?, found.sentiment()?);
    if a == 0.0 && b == 0.0 {
        return None;
    }
    Some(sentiment_similarity(a, b))
}

/// Weighted mean over the applied signals, clamped to [0, 1]
#[inline]
fn combine(signals: &[SignalScore]) -> f64 {
    let total_weight: f64 = signals.iter().map(|s| s.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = signals.iter().map(|s| s.weight * s.score).sum();
    (weighted / total_weight).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::imaging::ImageRoots;
    use crate::models::{ItemStatus, ItemType, Location};
    use crate::services::FeatureCache;
    use chrono::Utc;
    use std::path::Path;
    use std::sync::Arc;

    fn scorer_for(root: &Path) -> CompositeScorer {
        CompositeScorer::new(ImageMatcher::new(
            ImageRoots::new(root),
            Arc::new(FeatureCache::new(16, 60)),
        ))
    }

    fn create_item(id: &str, item_type: ItemType, description: &str, category: &str) -> Item {
        Item {
            id: id.to_string(),
            item_type,
            description: description.to_string(),
            category: category.to_string(),
            location: None,
            image_ref: None,
            user_email: format!("{}@example.com", id),
            created_at: Utc::now(),
            status: ItemStatus::Active,
        }
    }

    #[test]
    fn test_combine_renormalizes() {
        let signals = vec![
            SignalScore { signal: Signal::Text, score: 0.5, weight: 0.35 },
            SignalScore { signal: Signal::Color, score: 1.0, weight: 0.10 },
        ];
        let expected = (0.35 * 0.5 + 0.10) / 0.45;
        assert!((combine(&signals) - expected).abs() < 1e-12);
        assert_eq!(combine(&[]), 0.0);
    }

    #[test]
    fn test_applied_weights_renormalize_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let scorer = scorer_for(dir.path());
        let lost = create_item(
            "l1",
            ItemType::Lost,
            "Lost my precious black Gucci leather bag near Central Park, so sad",
            "Bags",
        );
        let found = create_item("f1", ItemType::Found, "black leather bag", "Bags");

        let result = scorer.score(&lost, &found);
        let applied = result.applied_weight();
        assert!(applied > 0.0 && applied <= ScoringWeights::without_image().total() + 1e-9);
        let normalized: f64 = result.signals.iter().map(|s| s.weight / applied).sum();
        assert!((normalized - 1.0).abs() < 1e-9);

        // Every signal perfect under the 0.95 table still scores exactly 1
        let perfect: Vec<SignalScore> = result
            .signals
            .iter()
            .map(|s| SignalScore { signal: s.signal, score: 1.0, weight: s.weight })
            .collect();
        assert!((combine(&perfect) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_descriptions_score_high() {
        let dir = tempfile::tempdir().unwrap();
        let scorer = scorer_for(dir.path());
        let lost = create_item("l1", ItemType::Lost, "black leather wallet", "Accessories");
        let found = create_item("f1", ItemType::Found, "black leather wallet", "Accessories");

        let result = scorer.score(&lost, &found);
        assert!((result.score - 1.0).abs() < 1e-9, "score was {}", result.score);
        assert!(result.image_similarity.is_none());
        assert!(result.signal(Signal::Image).is_none());
        assert!(result.signal(Signal::Brand).is_none());
    }

    #[test]
    fn test_black_leather_wallet_pair() {
        let dir = tempfile::tempdir().unwrap();
        let scorer = scorer_for(dir.path());
        let mut lost = create_item("l1", ItemType::Lost, "black leather wallet", "Accessories");
        let mut found = create_item(
            "f1",
            ItemType::Found,
            "black leather wallet found near park",
            "Accessories",
        );
        lost.location = Some(Location::new(12.970, 77.590));
        found.location = Some(Location::new(12.975, 77.595));

        let result = scorer.score(&lost, &found);
        assert!(result.score > 0.5, "score was {}", result.score);
        assert!((result.applied_weight() - 0.73).abs() < 1e-9);
        assert_eq!(result.signal(Signal::Color).map(|s| s.score), Some(1.0));
        assert_eq!(result.signal(Signal::Material).map(|s| s.score), Some(1.0));

        let joined = result.explanation.explanations.join(" ");
        assert!(joined.contains("black"));
        assert!(joined.contains("leather"));
    }

    #[test]
    fn test_empty_description_scores_text_zero() {
        let dir = tempfile::tempdir().unwrap();
        let scorer = scorer_for(dir.path());
        let lost = create_item("l1", ItemType::Lost, "", "Other");
        let found = create_item("f1", ItemType::Found, "silver ring", "Jewelry");

        let result = scorer.score(&lost, &found);
        assert_eq!(result.signal(Signal::Text).map(|s| s.score), Some(0.0));
        assert!(result.signal(Signal::Sentiment).is_none());
        assert!((0.0..=1.0).contains(&result.score));
    }

    #[test]
    fn test_unreadable_image_scores_zero_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        std::fs::write(dir.path().join("uploads/broken.jpg"), b"not an image").unwrap();

        let scorer = scorer_for(dir.path());
        let mut lost = create_item("l1", ItemType::Lost, "blue backpack", "Bags");
        let mut found = create_item("f1", ItemType::Found, "blue backpack", "Bags");
        lost.image_ref = Some("broken.jpg".to_string());
        found.image_ref = Some("/uploads/missing.jpg".to_string());

        let result = scorer.score(&lost, &found);
        assert_eq!(result.image_similarity, Some(0.0));
        assert_eq!(result.signal(Signal::Image).map(|s| s.score), Some(0.0));
        assert!(result.score > 0.0 && result.score < 1.0);
    }

    #[test]
    fn test_sentiment_requires_polarity() {
        let extractor = TextFeatureExtractor::new();
        let neutral_a = extractor.extract("blue umbrella");
        let neutral_b = extractor.extract("green umbrella");
        assert_eq!(sentiment_signal(&neutral_a, &neutral_b), None);

        let sad = extractor.extract("my precious ring is lost, so sad");
        assert!(sentiment_signal(&sad, &neutral_b).is_some());
        assert_eq!(sentiment_signal(&FeatureSet::default(), &sad), None);
    }
}
