// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ConfidenceLabel, Explanation, Item, ItemStatus, ItemType, Location, Match, MatchStatus,
    ScoringWeights, Signal,
};
pub use requests::{TriggerRequest, VerifyMatchRequest};
pub use responses::{ErrorResponse, ScoreResult, SignalScore, TriggerResponse};
