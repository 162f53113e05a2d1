use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use std::collections::HashSet;
use stop_words::{get, LANGUAGE};

use crate::core::lexicon::{self, Attribute, ADJECTIVES, NON_NOUNS};

/// Suffixes that mark a word as an adjective when it is long enough
const ADJECTIVE_SUFFIXES: &[&str] = &["ful", "ous", "ive", "able", "ible", "less", "ish", "ic", "al"];

/// Derived text attributes of one description.
///
/// Built fresh for every scoring call and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureSet {
    pub tokens: Vec<String>,
    pub stems: Vec<String>,
    pub nouns: Vec<String>,
    pub adjectives: Vec<String>,
    pub entities: Vec<String>,
    pub colors: Vec<String>,
    pub brands: Vec<String>,
    pub materials: Vec<String>,
    pub conditions: Vec<String>,
    pub key_phrases: Vec<String>,
    /// Summed per-word polarity, roughly -5..+5 for short text
    pub sentiment_score: f64,
}

impl FeatureSet {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn unique_words(&self) -> usize {
        self.tokens.iter().collect::<HashSet<_>>().len()
    }

    pub fn attribute(&self, attribute: Attribute) -> &[String] {
        match attribute {
            Attribute::KeyPhrase => &self.key_phrases,
            Attribute::Color => &self.colors,
            Attribute::Brand => &self.brands,
            Attribute::Material => &self.materials,
            Attribute::Condition => &self.conditions,
        }
    }

    /// Sentiment, or `None` for an empty description
    pub fn sentiment(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.sentiment_score)
    }
}

/// Split into lowercase word tokens on anything that is not a letter, digit
/// or underscore
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Text feature extractor: tokens, stems, shallow part-of-speech tags,
/// dictionary attributes and lexicon sentiment
pub struct TextFeatureExtractor {
    stemmer: Stemmer,
    stop_words: HashSet<String>,
}

impl TextFeatureExtractor {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stop_words: get(LANGUAGE::English).into_iter().collect(),
        }
    }

    /// Extract every feature of `text`. Empty or blank text yields an empty set.
    pub fn extract(&self, text: &str) -> FeatureSet {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return FeatureSet::default();
        }

        let lowered = text.to_lowercase();
        let stems = tokens
            .iter()
            .map(|t| self.stemmer.stem(t).into_owned())
            .collect();

        let adjectives: Vec<String> = tokens
            .iter()
            .filter(|t| is_adjective(t))
            .cloned()
            .collect();
        let nouns = tokens
            .iter()
            .filter(|t| self.is_noun(t))
            .cloned()
            .collect();

        FeatureSet {
            stems,
            nouns,
            adjectives,
            entities: extract_entities(text, &self.stop_words),
            colors: Attribute::Color.lexicon().scan(&lowered),
            brands: Attribute::Brand.lexicon().scan(&lowered),
            materials: Attribute::Material.lexicon().scan(&lowered),
            conditions: Attribute::Condition.lexicon().scan(&lowered),
            key_phrases: Attribute::KeyPhrase.lexicon().scan(&lowered),
            sentiment_score: sentiment(&tokens),
            tokens,
        }
    }

    fn is_noun(&self, token: &str) -> bool {
        token.chars().count() > 1
            && !token.chars().all(|c| c.is_ascii_digit())
            && !self.stop_words.contains(token)
            && !NON_NOUNS.contains(&token)
            && !is_adjective(token)
    }
}

impl Default for TextFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_adjective(token: &str) -> bool {
    if ADJECTIVES.contains(&token)
        || lexicon::COLORS.contains(token)
        || lexicon::CONDITIONS.contains(token)
        || lexicon::MATERIALS.contains(token)
    {
        return true;
    }
    token.len() > 5 && ADJECTIVE_SUFFIXES.iter().any(|s| token.ends_with(s))
}

/// Lexicon sentiment with single-word negation
fn sentiment(tokens: &[String]) -> f64 {
    let mut score = 0;
    let mut negate = false;
    for token in tokens {
        if lexicon::is_negator(token) {
            negate = true;
            continue;
        }
        if let Some(p) = lexicon::polarity(token) {
            score += if negate { -p } else { p };
        }
        negate = false;
    }
    score as f64
}

/// Proper-noun runs (people, places) found by capitalization.
///
/// A capitalized run counts when it does not open a sentence, or when it is
/// at least two words long. Entities are lowercased so they compare across
/// descriptions.
fn extract_entities(text: &str, stop_words: &HashSet<String>) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();

    for sentence in text.split(['.', '!', '?', '\n']) {
        let words: Vec<&str> = sentence
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty())
            .collect();

        let mut run: Vec<&str> = Vec::new();
        let mut run_start = 0;
        for (i, word) in words.into_iter().enumerate() {
            let capitalized = word.chars().next().is_some_and(char::is_uppercase);
            if capitalized {
                if run.is_empty() {
                    run_start = i;
                }
                run.push(word);
                continue;
            }
            flush_entity(&mut run, run_start, stop_words, &mut entities);
        }
        flush_entity(&mut run, run_start, stop_words, &mut entities);
    }

    entities
}

fn flush_entity(
    run: &mut Vec<&str>,
    run_start: usize,
    stop_words: &HashSet<String>,
    entities: &mut Vec<String>,
) {
    if run.is_empty() {
        return;
    }
    let opens_sentence = run_start == 0;
    if !opens_sentence || run.len() > 1 {
        let entity = run.join(" ").to_lowercase();
        let single_stop_word = run.len() == 1 && stop_words.contains(&entity);
        if !single_stop_word && !entities.contains(&entity) {
            entities.push(entity);
        }
    }
    run.clear();
}
