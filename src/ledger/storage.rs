//! Ledger storage interface and implementations
//!
//! This module defines the interface for persisting and querying results and
//! their rating histories, with an in-memory implementation that commits
//! batches atomically under a single write lock.

use crate::error::{LedgerError, Result};
use crate::ledger::batch::{CommitReceipt, LedgerBatch, LedgerOp, NewRating, NewResult};
use crate::types::{LedgerKey, MatchResult, Rating, RatingId, ResultId};
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

/// Entity counts, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerCounts {
    pub results: usize,
    pub ratings: usize,
    pub histories: usize,
}

/// Trait for ledger storage operations
pub trait LedgerStore: Send + Sync {
    /// Get the latest rating entry of one history
    fn latest_rating(&self, key: &LedgerKey) -> Result<Option<Rating>>;

    /// Get a full history, oldest first
    fn history(&self, key: &LedgerKey) -> Result<Vec<Rating>>;

    /// Get a result by id
    fn get_result(&self, result_id: &ResultId) -> Result<Option<MatchResult>>;

    /// Get the rating entries a result produced
    fn ratings_for_result(&self, result_id: &ResultId) -> Result<Vec<Rating>>;

    /// Get all results involving a player within a game, newest first
    fn results_for_player(&self, key: &LedgerKey) -> Result<Vec<MatchResult>>;

    /// Apply every operation of the batch, or none of them
    fn commit(&self, batch: LedgerBatch) -> Result<CommitReceipt>;

    /// Get entity counts
    fn counts(&self) -> Result<LedgerCounts>;
}

#[derive(Debug, Default)]
struct LedgerState {
    results: HashMap<ResultId, MatchResult>,
    ratings: HashMap<RatingId, Rating>,
    /// Rating ids per history, in commit order
    histories: HashMap<LedgerKey, Vec<RatingId>>,
    result_ratings: HashMap<ResultId, Vec<RatingId>>,
    next_sequence: u64,
}

impl LedgerState {
    /// Check that applying the batch leaves no orphan and no duplicate
    fn check(&self, batch: &LedgerBatch) -> std::result::Result<(), String> {
        let mut inserted: HashMap<ResultId, &NewResult> = HashMap::new();
        let mut deleted: HashSet<ResultId> = HashSet::new();
        let mut appended: HashMap<ResultId, Vec<&NewRating>> = HashMap::new();
        let mut appended_ids: HashSet<RatingId> = HashSet::new();
        let mut removed: HashSet<RatingId> = HashSet::new();

        for op in batch.ops() {
            match op {
                LedgerOp::InsertResult(result) => {
                    if result.winner_id == result.loser_id {
                        return Err(format!("result {} has one player on both sides", result.id));
                    }
                    if self.results.contains_key(&result.id)
                        || inserted.insert(result.id, result).is_some()
                    {
                        return Err(format!("result {} already exists", result.id));
                    }
                }
                LedgerOp::AppendRating(rating) => {
                    if self.ratings.contains_key(&rating.id) || !appended_ids.insert(rating.id) {
                        return Err(format!("rating {} already exists", rating.id));
                    }
                    appended.entry(rating.result_id).or_default().push(rating);
                }
                LedgerOp::DeleteResult(result_id) => {
                    if !self.results.contains_key(result_id) || !deleted.insert(*result_id) {
                        return Err(format!("result {} does not exist", result_id));
                    }
                }
                LedgerOp::RemoveRating(rating_id) => {
                    if !self.ratings.contains_key(rating_id) || !removed.insert(*rating_id) {
                        return Err(format!("rating {} does not exist", rating_id));
                    }
                }
            }
        }

        // Appended ratings belong to results inserted in this batch, one per participant
        for result_id in appended.keys() {
            if !inserted.contains_key(result_id) {
                return Err(format!(
                    "ratings reference result {} which is not inserted in this batch",
                    result_id
                ));
            }
        }
        for (result_id, result) in &inserted {
            let ratings = appended
                .get(result_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let players: BTreeSet<&str> = ratings.iter().map(|r| r.player_id.as_str()).collect();
            let expected: BTreeSet<&str> =
                [result.winner_id.as_str(), result.loser_id.as_str()].into();

            if ratings.len() != 2
                || players != expected
                || ratings.iter().any(|r| r.game_id != result.game_id)
            {
                return Err(format!(
                    "result {} needs exactly one rating per participant in game {}",
                    result_id, result.game_id
                ));
            }
        }

        // Removed ratings go with their result, and a deleted result takes all of its ratings
        for rating_id in &removed {
            let owner = self.ratings.get(rating_id).map(|r| r.result_id);
            if !owner.is_some_and(|result_id| deleted.contains(&result_id)) {
                return Err(format!(
                    "rating {} removed without deleting its result",
                    rating_id
                ));
            }
        }
        for result_id in &deleted {
            let leftover = self
                .result_ratings
                .get(result_id)
                .into_iter()
                .flatten()
                .any(|rating_id| !removed.contains(rating_id));
            if leftover {
                return Err(format!(
                    "result {} deleted while some of its ratings remain",
                    result_id
                ));
            }
        }

        Ok(())
    }

    fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    fn apply(&mut self, batch: LedgerBatch) -> CommitReceipt {
        let committed_at = current_timestamp();
        let mut receipt = CommitReceipt::default();

        for op in batch.into_ops() {
            match op {
                LedgerOp::InsertResult(new) => {
                    let result = MatchResult {
                        id: new.id,
                        game_id: new.game_id,
                        player_ids: [new.winner_id.clone(), new.loser_id.clone()].into(),
                        winner_id: new.winner_id,
                        loser_id: new.loser_id,
                        sequence: self.next_sequence(),
                        created_at: committed_at,
                    };
                    self.results.insert(result.id, result.clone());
                    receipt.results.push(result);
                }
                LedgerOp::AppendRating(new) => {
                    let rating = Rating {
                        id: new.id,
                        result_id: new.result_id,
                        player_id: new.player_id,
                        game_id: new.game_id,
                        value: new.value,
                        sequence: self.next_sequence(),
                        created_at: committed_at,
                    };
                    self.histories
                        .entry(rating.key())
                        .or_default()
                        .push(rating.id);
                    self.result_ratings
                        .entry(rating.result_id)
                        .or_default()
                        .push(rating.id);
                    self.ratings.insert(rating.id, rating.clone());
                    receipt.ratings.push(rating);
                }
                LedgerOp::DeleteResult(result_id) => {
                    self.results.remove(&result_id);
                    self.result_ratings.remove(&result_id);
                    receipt.deleted_results.push(result_id);
                }
                LedgerOp::RemoveRating(rating_id) => {
                    if let Some(rating) = self.ratings.remove(&rating_id) {
                        let key = rating.key();
                        if let Some(history) = self.histories.get_mut(&key) {
                            history.retain(|id| *id != rating_id);
                            if history.is_empty() {
                                self.histories.remove(&key);
                            }
                        }
                        if let Some(owned) = self.result_ratings.get_mut(&rating.result_id) {
                            owned.retain(|id| *id != rating_id);
                        }
                        receipt.removed_ratings.push(rating_id);
                    }
                }
            }
        }

        receipt
    }
}

/// In-memory ledger storage implementation
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.state.read().map_err(|_| {
            anyhow::Error::from(LedgerError::StorageUnavailable {
                message: "Failed to acquire ledger read lock".to_string(),
            })
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>> {
        self.state.write().map_err(|_| {
            anyhow::Error::from(LedgerError::StorageUnavailable {
                message: "Failed to acquire ledger write lock".to_string(),
            })
        })
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn latest_rating(&self, key: &LedgerKey) -> Result<Option<Rating>> {
        let state = self.read()?;

        Ok(state
            .histories
            .get(key)
            .and_then(|history| history.last())
            .and_then(|rating_id| state.ratings.get(rating_id))
            .cloned())
    }

    fn history(&self, key: &LedgerKey) -> Result<Vec<Rating>> {
        let state = self.read()?;

        Ok(state
            .histories
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|rating_id| state.ratings.get(rating_id))
            .cloned()
            .collect())
    }

    fn get_result(&self, result_id: &ResultId) -> Result<Option<MatchResult>> {
        let state = self.read()?;
        Ok(state.results.get(result_id).cloned())
    }

    fn ratings_for_result(&self, result_id: &ResultId) -> Result<Vec<Rating>> {
        let state = self.read()?;

        Ok(state
            .result_ratings
            .get(result_id)
            .into_iter()
            .flatten()
            .filter_map(|rating_id| state.ratings.get(rating_id))
            .cloned()
            .collect())
    }

    fn results_for_player(&self, key: &LedgerKey) -> Result<Vec<MatchResult>> {
        let state = self.read()?;

        let mut results: Vec<MatchResult> = state
            .results
            .values()
            .filter(|result| result.game_id == key.game_id && result.involves(&key.player_id))
            .cloned()
            .collect();

        // Newest first
        results.sort_by(|a, b| b.sequence.cmp(&a.sequence));

        Ok(results)
    }

    fn commit(&self, batch: LedgerBatch) -> Result<CommitReceipt> {
        let mut state = self.write()?;

        if let Err(reason) = state.check(&batch) {
            return Err(LedgerError::CommitFailed { reason }.into());
        }

        let ops = batch.len();
        let receipt = state.apply(batch);
        debug!(
            "Committed {} ops: {} results, {} ratings, {} deleted, {} removed",
            ops,
            receipt.results.len(),
            receipt.ratings.len(),
            receipt.deleted_results.len(),
            receipt.removed_ratings.len()
        );

        Ok(receipt)
    }

    fn counts(&self) -> Result<LedgerCounts> {
        let state = self.read()?;

        Ok(LedgerCounts {
            results: state.results.len(),
            ratings: state.ratings.len(),
            histories: state.histories.len(),
        })
    }
}
