use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::MatchError;

/// Which side of the lost & found exchange an item was reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    /// The type an item must have to be a candidate for this one
    pub fn opposite(self) -> Self {
        match self {
            ItemType::Lost => ItemType::Found,
            ItemType::Found => ItemType::Lost,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Lost => write!(f, "lost"),
            ItemType::Found => write!(f, "found"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Active,
    Resolved,
    Closed,
}

/// Reported location of an item.
///
/// Coordinates are read leniently: numbers and numeric strings are accepted,
/// anything else becomes `None` and the location is treated as missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, Default)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_coordinate")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    /// `(lat, lng)` if both are present, finite and in range
    pub fn checked(&self) -> Result<(f64, f64), MatchError> {
        let (lat, lng) = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(MatchError::MissingInput("location coordinates")),
        };
        if !lat.is_finite() || !lng.is_finite() || self.validate().is_err() {
            return Err(MatchError::InvalidCoordinate(format!("({}, {})", lat, lng)));
        }
        Ok((lat, lng))
    }

    /// Valid `(lat, lng)` pair, or `None` when either side is missing or out of range
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.checked().ok()
    }
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// A lost or found report, owned by the reporting collaborator.
///
/// Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(rename = "imageUrl", alias = "imageRef", default)]
    pub image_ref: Option<String>,
    #[serde(rename = "userEmail")]
    pub user_email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl Item {
    /// Image reference, if one was supplied and is not blank
    pub fn image(&self) -> Option<&str> {
        self.image_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.as_ref().and_then(Location::coordinates)
    }

    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

/// Discretized bucket of the composite score used for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl ConfidenceLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLabel::VeryHigh
        } else if score >= 0.6 {
            ConfidenceLabel::High
        } else if score >= 0.4 {
            ConfidenceLabel::Medium
        } else if score >= 0.2 {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::VeryLow
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLabel::VeryHigh => "Very High",
            ConfidenceLabel::High => "High",
            ConfidenceLabel::Medium => "Medium",
            ConfidenceLabel::Low => "Low",
            ConfidenceLabel::VeryLow => "Very Low",
        };
        f.write_str(label)
    }
}

/// Human-readable reasons behind a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanations: Vec<String>,
    pub confidence: ConfidenceLabel,
    /// Score rounded onto 0-100 for display
    pub score: u8,
}

/// Scored (lost, found) pairing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(rename = "lostItemId")]
    pub lost_item_id: String,
    #[serde(rename = "foundItemId")]
    pub found_item_id: String,
    #[serde(rename = "lostUserEmail")]
    pub lost_user_email: String,
    #[serde(rename = "foundUserEmail")]
    pub found_user_email: String,
    /// Canonical 0-1 score
    pub score: f64,
    #[serde(rename = "imageSimilarity")]
    pub image_similarity: Option<f64>,
    pub explanation: Explanation,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "verifiedAt", default)]
    pub verified_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn pair(&self) -> (&str, &str) {
        (&self.lost_item_id, &self.found_item_id)
    }

    /// Whether either side of the pairing was reported by `user_email`
    pub fn involves_user(&self, user_email: &str) -> bool {
        self.lost_user_email.eq_ignore_ascii_case(user_email)
            || self.found_user_email.eq_ignore_ascii_case(user_email)
    }

    pub fn involves_item(&self, item_id: &str) -> bool {
        self.lost_item_id == item_id || self.found_item_id == item_id
    }
}

/// Sub-scores that feed the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Image,
    Text,
    Phrase,
    Color,
    Brand,
    Material,
    Condition,
    Entity,
    Sentiment,
}

/// Scoring weights for one weight table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub image: f64,
    pub text: f64,
    pub phrase: f64,
    pub color: f64,
    pub brand: f64,
    pub material: f64,
    pub condition: f64,
    pub entity: f64,
    pub sentiment: f64,
}

impl ScoringWeights {
    /// Nominal weights when both items carry an image
    pub fn with_image() -> Self {
        Self {
            image: 0.25,
            text: 0.25,
            phrase: 0.15,
            color: 0.10,
            brand: 0.08,
            material: 0.08,
            condition: 0.04,
            entity: 0.04,
            sentiment: 0.01,
        }
    }

    /// Nominal weights without an image.
    ///
    /// 0.20 of the 0.25 image share moves into text, phrase and sentiment, so
    /// the table sums to 0.95. Scores stay in [0, 1] because only the weights
    /// of applied signals are summed.
    pub fn without_image() -> Self {
        Self {
            image: 0.0,
            text: 0.35,
            phrase: 0.20,
            color: 0.10,
            brand: 0.08,
            material: 0.08,
            condition: 0.04,
            entity: 0.04,
            sentiment: 0.06,
        }
    }

    pub fn weight(&self, signal: Signal) -> f64 {
        match signal {
            Signal::Image => self.image,
            Signal::Text => self.text,
            Signal::Phrase => self.phrase,
            Signal::Color => self.color,
            Signal::Brand => self.brand,
            Signal::Material => self.material,
            Signal::Condition => self.condition,
            Signal::Entity => self.entity,
            Signal::Sentiment => self.sentiment,
        }
    }

    pub fn total(&self) -> f64 {
        self.image
            + self.text
            + self.phrase
            + self.color
            + self.brand
            + self.material
            + self.condition
            + self.entity
            + self.sentiment
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::without_image()
    }
}
