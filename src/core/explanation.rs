use crate::core::distance::{days_between, item_distance_km, RECENCY_WINDOW_DAYS};
use crate::core::features::FeatureSet;
use crate::core::similarity::shared;
use crate::models::{ConfidenceLabel, Explanation, Item};

/// Image similarity at or above which the photos are called out
const SIMILAR_PHOTOS_THRESHOLD: f64 = 0.5;

/// Build the ordered, human-readable reasons behind a score
pub fn build_explanation(
    lost: &Item,
    found: &Item,
    lost_features: &FeatureSet,
    found_features: &FeatureSet,
    score: f64,
    image_similarity: Option<f64>,
) -> Explanation {
    let mut explanations = Vec::new();

    let colors = shared(&lost_features.colors, &found_features.colors);
    if !colors.is_empty() {
        explanations.push(format!("Both items are described as {}", colors.join(", ")));
    }

    let brands = shared(&lost_features.brands, &found_features.brands);
    if !brands.is_empty() {
        explanations.push(format!("Both items are {} brand", brands.join(", ")));
    }

    let materials = shared(&lost_features.materials, &found_features.materials);
    if !materials.is_empty() {
        explanations.push(format!("Both items are made of {}", materials.join(", ")));
    }

    let phrases = shared(&lost_features.key_phrases, &found_features.key_phrases);
    if !phrases.is_empty() {
        explanations.push(format!("Both descriptions mention: \"{}\"", phrases.join("\", \"")));
    }

    let conditions = shared(&lost_features.conditions, &found_features.conditions);
    if !conditions.is_empty() {
        explanations.push(format!("Both items are described as {}", conditions.join(", ")));
    }

    if !lost.category.is_empty() && lost.category.eq_ignore_ascii_case(&found.category) {
        explanations.push(format!("Both reported under {}", lost.category));
    }

    if let Some(distance) = item_distance_km(lost, found) {
        if distance < 1.0 {
            explanations.push(format!(
                "Found very close to where you lost it ({:.0}m away)",
                distance * 1000.0
            ));
        } else if distance < 5.0 {
            explanations.push(format!("Found within {:.1}km of where you lost it", distance));
        }
    }

    let days = days_between(lost.created_at, found.created_at);
    if days <= 1.0 {
        explanations.push("Found within 24 hours of when you lost it".to_string());
    } else if days <= RECENCY_WINDOW_DAYS {
        explanations.push(format!("Found within {} days of when you lost it", days.round()));
    }

    if let Some(similarity) = image_similarity.filter(|s| *s >= SIMILAR_PHOTOS_THRESHOLD) {
        explanations.push(format!(
            "Photos look similar ({}% image similarity)",
            (similarity * 100.0).round()
        ));
    }

    if explanations.is_empty() {
        let fallback = if score > 0.7 {
            "High similarity in description and characteristics"
        } else if score > 0.5 {
            "Moderate similarity in description and characteristics"
        } else {
            "Some similarity in description and characteristics"
        };
        explanations.push(fallback.to_string());
    }

    Explanation {
        explanations,
        confidence: ConfidenceLabel::from_score(score),
        score: display_score(score),
    }
}

/// Score rounded onto 0-100
#[inline]
pub fn display_score(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::TextFeatureExtractor;
    use crate::models::{ItemStatus, ItemType, Location};
    use chrono::{Duration, Utc};

    fn item(id: &str, item_type: ItemType, description: &str, location: Option<Location>) -> Item {
        Item {
            id: id.to_string(),
            item_type,
            description: description.to_string(),
            category: "Accessories".to_string(),
            location,
            image_ref: None,
            user_email: format!("{}@example.com", id),
            created_at: Utc::now(),
            status: ItemStatus::Active,
        }
    }

    #[test]
    fn test_explanation_lists_shared_attributes_in_order() {
        let extractor = TextFeatureExtractor::new();
        let lost = item("lost", ItemType::Lost, "black leather wallet", Some(Location::new(12.970, 77.590)));
        let found = item(
            "found",
            ItemType::Found,
            "black leather wallet found near park",
            Some(Location::new(12.975, 77.595)),
        );

        let explanation = build_explanation(
            &lost,
            &found,
            &extractor.extract(&lost.description),
            &extractor.extract(&found.description),
            0.83,
            None,
        );

        assert_eq!(explanation.explanations[0], "Both items are described as black");
        assert_eq!(explanation.explanations[1], "Both items are made of leather");
        assert_eq!(explanation.explanations[2], "Both descriptions mention: \"black leather\"");
        assert!(explanation.explanations.contains(&"Both reported under Accessories".to_string()));
        assert!(explanation.explanations.iter().any(|e| e.starts_with("Found very close")));
        assert!(explanation.explanations.contains(&"Found within 24 hours of when you lost it".to_string()));
        assert_eq!(explanation.confidence, ConfidenceLabel::VeryHigh);
        assert_eq!(explanation.score, 83);
    }

    #[test]
    fn test_fallback_when_nothing_specific() {
        let mut lost = item("lost", ItemType::Lost, "umbrella", None);
        let mut found = item("found", ItemType::Found, "charger", None);
        lost.category = "Other".to_string();
        found.category = "Electronics".to_string();
        found.created_at = lost.created_at + Duration::days(30);

        let explanation = build_explanation(&lost, &found, &FeatureSet::default(), &FeatureSet::default(), 0.1, None);
        assert_eq!(
            explanation.explanations,
            vec!["Some similarity in description and characteristics".to_string()]
        );
        assert_eq!(explanation.confidence, ConfidenceLabel::VeryLow);
        assert_eq!(explanation.score, 10);
    }

    #[test]
    fn test_recency_and_photo_lines() {
        let lost = item("lost", ItemType::Lost, "", None);
        let mut found = item("found", ItemType::Found, "", None);
        found.category = String::new();
        found.created_at = lost.created_at + Duration::days(3);

        let explanation = build_explanation(&lost, &found, &FeatureSet::default(), &FeatureSet::default(), 0.5, Some(0.92));
        assert_eq!(
            explanation.explanations,
            vec![
                "Found within 3 days of when you lost it".to_string(),
                "Photos look similar (92% image similarity)".to_string(),
            ]
        );
    }

    #[test]
    fn test_display_score() {
        assert_eq!(display_score(0.0), 0);
        assert_eq!(display_score(0.456), 46);
        assert_eq!(display_score(1.0), 100);
        assert_eq!(display_score(1.7), 100);
    }
}
