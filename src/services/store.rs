use chrono::Utc;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::MatchError;
use crate::models::{Match, MatchStatus};

/// In-memory match store.
///
/// Holds at most one match per (lost item, found item) pair.
#[derive(Debug, Default)]
pub struct MatchStore {
    matches: RwLock<Vec<Match>>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, dropping any repeated pairs
    pub fn from_matches(matches: Vec<Match>) -> Self {
        let mut unique: Vec<Match> = Vec::with_capacity(matches.len());
        for m in matches {
            if !unique.iter().any(|existing| existing.pair() == m.pair()) {
                unique.push(m);
            }
        }
        Self {
            matches: RwLock::new(unique),
        }
    }

    /// Load a JSON array of matches; a missing file is an empty store
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, MatchError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)?;
        let matches: Vec<Match> = serde_json::from_str(&raw)?;
        Ok(Self::from_matches(matches))
    }

    pub async fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MatchError> {
        let matches = self.matches.read().await;
        let raw = serde_json::to_string_pretty(&*matches)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Insert unless the pair already has a match. Returns whether it was inserted.
    pub async fn insert_unique(&self, new_match: Match) -> bool {
        let mut matches = self.matches.write().await;
        if matches.iter().any(|m| m.pair() == new_match.pair()) {
            debug!(
                "Skipping duplicate match ({}, {})",
                new_match.lost_item_id, new_match.found_item_id
            );
            return false;
        }
        matches.push(new_match);
        true
    }

    /// Remove every match where `user_email` is either reporter.
    /// Returns how many were removed.
    pub async fn remove_for_user(&self, user_email: &str) -> usize {
        let mut matches = self.matches.write().await;
        let before = matches.len();
        matches.retain(|m| !m.involves_user(user_email));
        let removed = before - matches.len();
        info!("Removed {} existing matches for user {}", removed, user_email);
        removed
    }

    /// Matches involving `user_email`, optionally only those touching `item_id`
    pub async fn for_user(&self, user_email: &str, item_id: Option<&str>) -> Vec<Match> {
        let matches = self.matches.read().await;
        matches
            .iter()
            .filter(|m| m.involves_user(user_email))
            .filter(|m| item_id.map_or(true, |id| m.involves_item(id)))
            .cloned()
            .collect()
    }

    /// Mark a match verified or rejected
    pub async fn verify(&self, match_id: &str, is_verified: bool) -> Result<Match, MatchError> {
        let mut matches = self.matches.write().await;
        let found = matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| MatchError::NotFound(format!("match {}", match_id)))?;

        found.status = if is_verified {
            MatchStatus::Verified
        } else {
            MatchStatus::Rejected
        };
        found.verified_at = Some(Utc::now());
        Ok(found.clone())
    }

    pub async fn all(&self) -> Vec<Match> {
        self.matches.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.matches.read().await.is_empty()
    }
}
