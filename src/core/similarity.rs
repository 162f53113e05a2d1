use std::collections::{HashMap, HashSet};

use crate::core::features::tokenize;

/// Overlap of two attribute lists as |A ∩ B| / |A ∪ B|.
///
/// Both empty counts as agreement (1.0); exactly one empty is 0.0. This one
/// routine serves colors, brands, materials, conditions, key phrases and
/// entities.
pub fn categorical_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let set_a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let set_b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

/// Values present in both lists, in the order of `a`
pub fn shared<'a>(a: &'a [String], b: &[String]) -> Vec<&'a str> {
    let mut common: Vec<&str> = Vec::new();
    for value in a {
        if b.contains(value) && !common.contains(&value.as_str()) {
            common.push(value);
        }
    }
    common
}

/// Cosine similarity dot / (‖a‖‖b‖); 0.0 when either magnitude is zero.
///
/// Vectors of different length are compared over their common prefix.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut mag_a = 0.0;
    let mut mag_b = 0.0;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    let magnitude = mag_a.sqrt() * mag_b.sqrt();
    if magnitude == 0.0 {
        return 0.0;
    }
    (dot / magnitude).clamp(0.0, 1.0)
}

/// Cosine similarity of term-frequency vectors over the union vocabulary
pub fn term_frequency_cosine(tokens_a: &[String], tokens_b: &[String]) -> f64 {
    let mut vocabulary: Vec<&str> = Vec::new();
    let mut freq_a: HashMap<&str, f64> = HashMap::new();
    let mut freq_b: HashMap<&str, f64> = HashMap::new();

    for token in tokens_a {
        if !freq_a.contains_key(token.as_str()) && !freq_b.contains_key(token.as_str()) {
            vocabulary.push(token);
        }
        *freq_a.entry(token).or_default() += 1.0;
    }
    for token in tokens_b {
        if !freq_a.contains_key(token.as_str()) && !freq_b.contains_key(token.as_str()) {
            vocabulary.push(token);
        }
        *freq_b.entry(token).or_default() += 1.0;
    }

    let vector_a: Vec<f64> = vocabulary.iter().map(|t| freq_a.get(t).copied().unwrap_or(0.0)).collect();
    let vector_b: Vec<f64> = vocabulary.iter().map(|t| freq_b.get(t).copied().unwrap_or(0.0)).collect();

    cosine_similarity(&vector_a, &vector_b)
}

/// `1 - levenshtein / max(len_a, len_b)` over characters
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - strsim::levenshtein(a, b) as f64 / max_len as f64
}

/// Average of three string similarity signals on two descriptions:
/// bigram Dice on the raw strings, term-frequency cosine, and normalized
/// Levenshtein. Empty input on either side scores 0.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }

    let dice = strsim::sorensen_dice(a, b);
    let cosine = term_frequency_cosine(&tokenize(a), &tokenize(b));
    let levenshtein = levenshtein_similarity(a, b);

    ((dice + cosine + levenshtein) / 3.0).clamp(0.0, 1.0)
}

/// Closeness of two sentiment scores, each mapped from -5..+5 onto 0..1
pub fn sentiment_similarity(a: f64, b: f64) -> f64 {
    let normalized_a = (a + 5.0) / 10.0;
    let normalized_b = (b + 5.0) / 10.0;
    (1.0 - (normalized_a - normalized_b).abs()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_categorical_identity_and_absence() {
        let a = strings(&["black", "leather"]);
        let empty: Vec<String> = vec![];

        assert_eq!(categorical_similarity(&a, &a), 1.0);
        assert_eq!(categorical_similarity(&empty, &empty), 1.0);
        assert_eq!(categorical_similarity(&empty, &a), 0.0);
        assert_eq!(categorical_similarity(&a, &empty), 0.0);
    }

    #[test]
    fn test_categorical_jaccard() {
        let a = strings(&["black", "red"]);
        let b = strings(&["black", "blue", "green"]);
        assert!((categorical_similarity(&a, &b) - 0.25).abs() < 1e-12);

        // Duplicates do not inflate the overlap
        let dup = strings(&["black", "black"]);
        assert_eq!(categorical_similarity(&dup, &strings(&["black"])), 1.0);
    }

    #[test]
    fn test_shared_preserves_order() {
        let a = strings(&["silver", "gold", "black"]);
        let b = strings(&["black", "silver"]);
        assert_eq!(shared(&a, &b), vec!["silver", "black"]);
    }

    #[test]
    fn test_cosine_similarity() {
        let v = vec![0.2, 0.5, 0.3];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);

        let zero = vec![0.0; 3];
        let score = cosine_similarity(&zero, &zero);
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());

        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_term_frequency_cosine() {
        let a = tokenize("black leather wallet");
        let b = tokenize("black leather wallet found near park");
        let expected = 3.0 / (3.0_f64.sqrt() * 6.0_f64.sqrt());
        assert!((term_frequency_cosine(&a, &b) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_text_similarity() {
        assert_eq!(text_similarity("", "black wallet"), 0.0);
        assert_eq!(text_similarity("black wallet", "   "), 0.0);
        assert!((text_similarity("black wallet", "black wallet") - 1.0).abs() < 1e-9);

        let close = text_similarity("black leather wallet", "black leather wallet found near park");
        let far = text_similarity("black leather wallet", "yellow umbrella");
        assert!(close > 0.6, "close = {}", close);
        assert!(far < close);
        assert!((0.0..=1.0).contains(&far));
    }

    #[test]
    fn test_levenshtein_similarity() {
        assert_eq!(levenshtein_similarity("kitten", "kitten"), 1.0);
        assert!((levenshtein_similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sentiment_similarity() {
        assert_eq!(sentiment_similarity(0.0, 0.0), 1.0);
        assert!((sentiment_similarity(3.0, -3.0) - 0.4).abs() < 1e-12);
        assert_eq!(sentiment_similarity(9.0, -9.0), 0.0);
    }
}
