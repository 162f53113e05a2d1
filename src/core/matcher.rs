use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::filters::is_candidate;
use crate::core::scoring::CompositeScorer;
use crate::error::MatchError;
use crate::models::{Item, ItemType, Match, MatchStatus, ScoreResult, TriggerResponse};
use crate::services::{ItemRepository, MatchStore};

/// Default acceptance threshold for a match
pub const DEFAULT_THRESHOLD: f64 = 0.25;

/// Default number of pairs scored concurrently
pub const DEFAULT_WORKERS: usize = 4;

/// Default upper bound on scoring one pair
pub const DEFAULT_PAIR_TIMEOUT: Duration = Duration::from_secs(10);

/// Where one candidate ended up after passing through the pipeline
#[derive(Debug)]
pub enum PairOutcome {
    /// Scored at or above the threshold
    Accepted(Match),
    /// Scored below the threshold
    Discarded { candidate_id: String, score: f64 },
    /// Scoring panicked or timed out; the pair is left out of the results
    Failed(MatchError),
}

/// Result of the matching process
#[derive(Debug, Default)]
pub struct MatchResult {
    /// Accepted matches in completion order
    pub matches: Vec<Match>,
    pub total_candidates: usize,
    pub scored: usize,
    pub discarded: usize,
    pub failed: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Candidate filtering (opposite type, distinct reporter, active)
/// 2. Concurrent per-pair scoring on blocking workers, each under a timeout
/// 3. Threshold acceptance
///
/// A worker permit is held until the blocking scorer returns, so a pair that
/// times out still occupies its worker and at most `workers` decodes run at
/// once. Clones share the same permits.
///
/// No ordering is imposed on the result; use [`sort_for_display`] when
/// presenting it.
#[derive(Clone)]
pub struct Matcher {
    scorer: Arc<CompositeScorer>,
    threshold: f64,
    workers: usize,
    pair_timeout: Duration,
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
}

impl Matcher {
    pub fn new(scorer: CompositeScorer) -> Self {
        Self {
            scorer: Arc::new(scorer),
            threshold: DEFAULT_THRESHOLD,
            workers: DEFAULT_WORKERS,
            pair_timeout: DEFAULT_PAIR_TIMEOUT,
            permits: Arc::new(Semaphore::new(DEFAULT_WORKERS)),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.permits = Arc::new(Semaphore::new(self.workers));
        self
    }

    pub fn with_pair_timeout(mut self, pair_timeout: Duration) -> Self {
        self.pair_timeout = pair_timeout;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pairs currently being scored on blocking workers, including ones
    /// whose caller already gave up on them
    pub fn pairs_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }

    /// Score a single (lost, found) pair
    pub fn score(&self, lost: &Item, found: &Item) -> ScoreResult {
        self.scorer.score(lost, found)
    }

    /// Score `new_item` against every eligible candidate in `candidates`.
    ///
    /// A pair that panics or exceeds the pair timeout is counted as failed
    /// and does not affect the other pairs.
    pub async fn find_matches(&self, new_item: &Item, candidates: Vec<Item>) -> MatchResult {
        let eligible: Vec<Item> = candidates
            .into_iter()
            .filter(|candidate| is_candidate(new_item, candidate))
            .collect();
        let total_candidates = eligible.len();

        info!(
            "Scoring {} item {} against {} candidates",
            new_item.item_type, new_item.id, total_candidates
        );

        let new_item = Arc::new(new_item.clone());
        let outcomes: Vec<PairOutcome> = stream::iter(eligible)
            .map(|candidate| self.score_pair(Arc::clone(&new_item), candidate))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut result = MatchResult {
            total_candidates,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                PairOutcome::Accepted(m) => {
                    result.scored += 1;
                    result.matches.push(m);
                }
                PairOutcome::Discarded { .. } => {
                    result.scored += 1;
                    result.discarded += 1;
                }
                PairOutcome::Failed(e) => {
                    warn!("Dropping pair: {}", e);
                    result.failed += 1;
                }
            }
        }

        info!(
            "Item {}: {} accepted, {} discarded, {} failed",
            new_item.id,
            result.matches.len(),
            result.discarded,
            result.failed
        );
        result
    }

    /// Fetch the opposite-type pool from `repo` and match against it.
    ///
    /// Failing to obtain the pool is the only error this returns.
    pub async fn find_matches_from<R: ItemRepository>(
        &self,
        new_item: &Item,
        repo: &R,
    ) -> Result<MatchResult, MatchError> {
        let pool = repo
            .active_items(new_item.item_type.opposite())
            .await
            .map_err(|e| {
                error!("Failed to fetch candidate pool for {}: {}", new_item.id, e);
                MatchError::CandidatePool(e.to_string())
            })?;
        Ok(self.find_matches(new_item, pool).await)
    }

    /// Re-run matching for every active item reported by `user_email`.
    ///
    /// With `recalculate`, the user's existing matches are removed first so
    /// the run replaces them; otherwise only missing pairs are added.
    pub async fn trigger<R: ItemRepository>(
        &self,
        user_email: &str,
        recalculate: bool,
        repo: &R,
        store: &MatchStore,
    ) -> Result<TriggerResponse, MatchError> {
        let user_items = repo.items_for_user(user_email).await?;
        let mut fresh = Vec::new();
        for item in user_items.iter().filter(|item| item.is_active()) {
            let result = self.find_matches_from(item, repo).await?;
            fresh.extend(result.matches);
        }
        let recalculated_matches = fresh.len();

        // The store is only touched once every item has been matched
        let removed_matches = if recalculate {
            store.remove_for_user(user_email).await
        } else {
            0
        };

        let mut new_matches_found = 0;
        for m in fresh {
            if store.insert_unique(m).await {
                new_matches_found += 1;
            }
        }

        let total_matches = store.len().await;
        info!(
            "Matching for {} completed: {} new, {} recalculated, {} total",
            user_email, new_matches_found, recalculated_matches, total_matches
        );

        Ok(TriggerResponse {
            message: "Matching completed".to_string(),
            removed_matches,
            new_matches_found,
            recalculated_matches,
            total_matches,
        })
    }

    async fn score_pair(&self, new_item: Arc<Item>, candidate: Item) -> PairOutcome {
        let (lost_id, found_id) = match new_item.item_type {
            ItemType::Lost => (new_item.id.clone(), candidate.id.clone()),
            ItemType::Found => (candidate.id.clone(), new_item.id.clone()),
        };
        debug!("Pair ({}, {}) NEW", lost_id, found_id);

        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                return PairOutcome::Failed(MatchError::PairFailed {
                    lost_item_id: lost_id,
                    found_item_id: found_id,
                    reason: format!("worker pool closed: {}", e),
                });
            }
        };

        let scorer = Arc::clone(&self.scorer);
        let in_flight = Arc::clone(&self.in_flight);
        let new_for_worker = Arc::clone(&new_item);
        let candidate = Arc::new(candidate);
        let candidate_for_worker = Arc::clone(&candidate);
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _busy = InFlight::enter(in_flight);
            let (lost, found) = orient(&new_for_worker, &candidate_for_worker);
            scorer.score(lost, found)
        });

        let scored = match tokio::time::timeout(self.pair_timeout, task).await {
            Ok(Ok(scored)) => scored,
            Ok(Err(join_error)) => {
                return PairOutcome::Failed(MatchError::PairFailed {
                    lost_item_id: lost_id,
                    found_item_id: found_id,
                    reason: format!("scoring panicked: {}", join_error),
                });
            }
            Err(_) => {
                return PairOutcome::Failed(MatchError::PairFailed {
                    lost_item_id: lost_id,
                    found_item_id: found_id,
                    reason: format!("timed out after {:?}", self.pair_timeout),
                });
            }
        };
        debug!("Pair ({}, {}) SCORED {:.3}", lost_id, found_id, scored.score);

        if scored.score < self.threshold {
            debug!("Pair ({}, {}) DISCARDED", lost_id, found_id);
            return PairOutcome::Discarded {
                candidate_id: candidate.id.clone(),
                score: scored.score,
            };
        }

        debug!("Pair ({}, {}) ACCEPTED", lost_id, found_id);
        let (lost, found) = orient(&new_item, &candidate);
        PairOutcome::Accepted(build_match(lost, found, scored))
    }
}

/// Counts a running blocking scorer; released on return or panic
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Put a pair in (lost, found) order
#[inline]
pub fn orient<'a>(a: &'a Item, b: &'a Item) -> (&'a Item, &'a Item) {
    match a.item_type {
        ItemType::Lost => (a, b),
        ItemType::Found => (b, a),
    }
}

fn build_match(lost: &Item, found: &Item, scored: ScoreResult) -> Match {
    Match {
        id: Uuid::new_v4().to_string(),
        lost_item_id: lost.id.clone(),
        found_item_id: found.id.clone(),
        lost_user_email: lost.user_email.clone(),
        found_user_email: found.user_email.clone(),
        score: scored.score,
        image_similarity: scored.image_similarity,
        explanation: scored.explanation,
        status: MatchStatus::Pending,
        created_at: Utc::now(),
        verified_at: None,
    }
}

/// Sort by score (descending), then by match id for a stable presentation
pub fn sort_for_display(matches: &mut [Match]) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::imaging::{ImageMatcher, ImageRoots};
    use crate::models::{ItemStatus, Location};
    use crate::services::{FeatureCache, InMemoryItems};
    use std::path::Path;

    fn matcher_for(root: &Path) -> Matcher {
        let images = ImageMatcher::new(ImageRoots::new(root), Arc::new(FeatureCache::new(16, 60)));
        Matcher::new(CompositeScorer::new(images))
    }

    fn create_item(id: &str, item_type: ItemType, description: &str, email: &str) -> Item {
        Item {
            id: id.to_string(),
            item_type,
            description: description.to_string(),
            category: "Accessories".to_string(),
            location: Some(Location::new(12.97, 77.59)),
            image_ref: None,
            user_email: email.to_string(),
            created_at: Utc::now(),
            status: ItemStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_find_matches_basic() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = matcher_for(dir.path());
        let lost = create_item("l1", ItemType::Lost, "black leather wallet", "owner@example.com");

        let candidates = vec![
            create_item("f1", ItemType::Found, "black leather wallet", "finder@example.com"),
            create_item("f2", ItemType::Found, "black leather wallet", "owner@example.com"), // Same reporter
            create_item("l2", ItemType::Lost, "black leather wallet", "other@example.com"),  // Same type
        ];

        let result = matcher.find_matches(&lost, candidates).await;

        assert_eq!(result.total_candidates, 1);
        assert_eq!(result.matches.len(), 1);
        let m = &result.matches[0];
        assert_eq!(m.pair(), ("l1", "f1"));
        assert_eq!(m.lost_user_email, "owner@example.com");
        assert_eq!(m.status, MatchStatus::Pending);
    }

    #[tokio::test]
    async fn test_found_item_is_oriented_as_found() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = matcher_for(dir.path());
        let found = create_item("f1", ItemType::Found, "silver gold watch", "finder@example.com");
        let lost = create_item("l1", ItemType::Lost, "silver gold watch", "owner@example.com");

        let result = matcher.find_matches(&found, vec![lost]).await;
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].pair(), ("l1", "f1"));
        assert_eq!(result.matches[0].found_user_email, "finder@example.com");
    }

    #[tokio::test]
    async fn test_below_threshold_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = matcher_for(dir.path()).with_threshold(0.99);
        let lost = create_item("l1", ItemType::Lost, "black leather wallet", "owner@example.com");
        let found = create_item("f1", ItemType::Found, "umbrella left on bus", "finder@example.com");

        let result = matcher.find_matches(&lost, vec![found]).await;
        assert!(result.matches.is_empty());
        assert_eq!(result.scored, 1);
        assert_eq!(result.discarded, 1);
    }

    #[tokio::test]
    async fn test_trigger_without_recalculate_adds_missing_only() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = matcher_for(dir.path());
        let repo = InMemoryItems::new(vec![
            create_item("l1", ItemType::Lost, "black leather wallet", "owner@example.com"),
            create_item("f1", ItemType::Found, "black leather wallet", "finder@example.com"),
        ]);
        let store = MatchStore::new();

        let first = matcher.trigger("owner@example.com", false, &repo, &store).await.unwrap();
        assert_eq!(first.new_matches_found, 1);
        assert_eq!(first.total_matches, 1);

        let second = matcher.trigger("owner@example.com", false, &repo, &store).await.unwrap();
        assert_eq!(second.new_matches_found, 0);
        assert_eq!(second.recalculated_matches, 1);
        assert_eq!(second.total_matches, 1);
    }

    #[test]
    fn test_sort_for_display() {
        let lost = create_item("l1", ItemType::Lost, "", "a@example.com");
        let found = create_item("f1", ItemType::Found, "", "b@example.com");
        let scorer_result = |score: f64| ScoreResult {
            score,
            image_similarity: None,
            signals: vec![],
            legacy_score: 0.0,
            explanation: crate::models::Explanation {
                explanations: vec![],
                confidence: crate::models::ConfidenceLabel::from_score(score),
                score: 0,
            },
        };

        let mut matches = vec![
            build_match(&lost, &found, scorer_result(0.3)),
            build_match(&lost, &found, scorer_result(0.9)),
            build_match(&lost, &found, scorer_result(0.6)),
        ];
        sort_for_display(&mut matches);
        let scores: Vec<f64> = matches.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.3]);
    }
}
