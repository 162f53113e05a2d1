//! Lost & Found matching engine
//!
//! Scores reported lost items against found items (and the reverse) using
//! text features, dictionary attributes, sentiment and image content, and
//! turns pairs above a threshold into explained matches.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{CompositeScorer, MatchResult, Matcher, distance::haversine_distance};
pub use error::MatchError;
pub use models::{Item, ItemType, Match, ScoreResult, ScoringWeights, TriggerResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let distance = haversine_distance(12.97, 77.59, 12.97, 77.59);
        assert_eq!(distance, 0.0);
        assert!((ScoringWeights::default().total() - 0.95).abs() < 1e-9);
    }
}
