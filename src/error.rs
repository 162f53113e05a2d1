use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while scoring lost/found pairs.
///
/// Only `CandidatePool` is fatal to a batch. Every other kind is absorbed at
/// the signal or pair boundary by the composite scorer and the matcher.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    #[error("Unreadable image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("Unresolvable image reference: {0}")]
    UnresolvableImage(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Failed to obtain candidate pool: {0}")]
    CandidatePool(String),

    #[error("Scoring failed for pair ({lost_item_id}, {found_item_id}): {reason}")]
    PairFailed {
        lost_item_id: String,
        found_item_id: String,
        reason: String,
    },

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Match store error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl MatchError {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        MatchError::UnreadableImage {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
