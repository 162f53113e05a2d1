//! Classic four-factor score kept for diagnostics.
//!
//! It lives on its own scale and is reported next to the composite score,
//! never combined with it.

use std::collections::HashSet;

use crate::core::distance::{days_between, item_distance_km, normalized_distance, within_recency_window};
use crate::models::Item;

const DESCRIPTION_WEIGHT: f64 = 0.4;
const CATEGORY_WEIGHT: f64 = 0.3;
const PROXIMITY_WEIGHT: f64 = 0.2;
const RECENCY_BONUS: f64 = 0.1;

/// Description Jaccard, exact category, proximity and a recency bonus, capped at 1
pub fn classic_score(lost: &Item, found: &Item) -> f64 {
    let mut score = word_jaccard(&lost.description, &found.description) * DESCRIPTION_WEIGHT;

    if lost.category == found.category {
        score += CATEGORY_WEIGHT;
    }

    score += (1.0 - normalized_distance(item_distance_km(lost, found))) * PROXIMITY_WEIGHT;

    if within_recency_window(days_between(lost.created_at, found.created_at)) {
        score += RECENCY_BONUS;
    }

    score.min(1.0)
}

/// Jaccard overlap of whitespace-separated words after stripping punctuation
fn word_jaccard(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let words_a = normalized_words(a);
    let words_b = normalized_words(b);
    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }
    words_a.intersection(&words_b).count() as f64 / union as f64
}

fn normalized_words(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}
