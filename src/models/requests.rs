use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to re-run matching for every item a user reported
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TriggerRequest {
    #[validate(email)]
    #[serde(alias = "user_email", rename = "userEmail")]
    pub user_email: String,
    /// Remove the user's existing matches before re-inserting fresh ones
    #[serde(default)]
    pub recalculate: bool,
}

/// Request to verify or reject a match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "match_id", rename = "matchId")]
    pub match_id: String,
    #[serde(alias = "is_verified", rename = "isVerified")]
    pub is_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_request_requires_email() {
        let request: TriggerRequest =
            serde_json::from_str(r#"{"userEmail": "not-an-email"}"#).unwrap();
        assert!(request.validate().is_err());
        assert!(!request.recalculate);

        let request: TriggerRequest =
            serde_json::from_str(r#"{"userEmail": "owner@example.com", "recalculate": true}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.recalculate);
    }
}
