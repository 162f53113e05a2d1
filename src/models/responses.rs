use serde::{Deserialize, Serialize};
use crate::models::domain::{Explanation, Signal};

/// One applied sub-score and the weight it carried
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalScore {
    pub signal: Signal,
    pub score: f64,
    pub weight: f64,
}

/// Result of scoring a single (lost, found) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Canonical multi-signal score in [0, 1]
    pub score: f64,
    #[serde(rename = "imageSimilarity")]
    pub image_similarity: Option<f64>,
    /// Signals that contributed, in weighting order
    pub signals: Vec<SignalScore>,
    /// Classic category/description/location/time score, reported for
    /// diagnostics only
    #[serde(rename = "legacyScore")]
    pub legacy_score: f64,
    pub explanation: Explanation,
}

impl ScoreResult {
    pub fn signal(&self, signal: Signal) -> Option<&SignalScore> {
        self.signals.iter().find(|s| s.signal == signal)
    }

    /// Sum of the weights that were actually applied
    pub fn applied_weight(&self) -> f64 {
        self.signals.iter().map(|s| s.weight).sum()
    }
}

/// Summary of a manual matching trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub message: String,
    #[serde(rename = "removedMatches")]
    pub removed_matches: usize,
    #[serde(rename = "newMatchesFound")]
    pub new_matches_found: usize,
    #[serde(rename = "recalculatedMatches")]
    pub recalculated_matches: usize,
    #[serde(rename = "totalMatches")]
    pub total_matches: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
