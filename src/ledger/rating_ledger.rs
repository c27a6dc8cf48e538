//! Rating ledger
//!
//! Query and commit facade over a `LedgerStore`. Reads answer "what is the
//! current rating" and "which result came last" for one (player, game)
//! history; writes go through staged `LedgerBatch`es.

use crate::error::Result;
use crate::ledger::batch::{CommitReceipt, LedgerBatch};
use crate::ledger::storage::{InMemoryLedgerStore, LedgerCounts, LedgerStore};
use crate::types::{GameId, LedgerKey, MatchResult, Rating, ResultId};
use std::sync::Arc;
use tracing::debug;

/// Append-only, per-(player, game) rating history
#[derive(Clone)]
pub struct RatingLedger {
    store: Arc<dyn LedgerStore>,
    default_rating: f64,
}

impl RatingLedger {
    pub fn new(store: Arc<dyn LedgerStore>, default_rating: f64) -> Self {
        Self {
            store,
            default_rating,
        }
    }

    /// Ledger backed by a fresh in-memory store
    pub fn in_memory(default_rating: f64) -> Self {
        Self::new(Arc::new(InMemoryLedgerStore::new()), default_rating)
    }

    /// Rating of a player with no history in a game
    pub fn default_rating(&self) -> f64 {
        self.default_rating
    }

    /// Value of the latest entry, or the default when there is no history
    ///
    /// Missing history is not an error; `Err` means the store is unavailable.
    pub fn current_rating(&self, player_id: &str, game_id: GameId) -> Result<f64> {
        let key = LedgerKey::new(player_id, game_id);
        let value = self
            .store
            .latest_rating(&key)?
            .map(|rating| rating.value)
            .unwrap_or(self.default_rating);

        debug!("Current rating for {}: {}", key, value);
        Ok(value)
    }

    /// Full history of one player in one game, oldest first
    pub fn history(&self, player_id: &str, game_id: GameId) -> Result<Vec<Rating>> {
        self.store.history(&LedgerKey::new(player_id, game_id))
    }

    /// Most recently created result the player took part in within the game
    pub fn latest_result_for(&self, player_id: &str, game_id: GameId) -> Result<Option<ResultId>> {
        Ok(self
            .store
            .latest_rating(&LedgerKey::new(player_id, game_id))?
            .map(|rating| rating.result_id))
    }

    pub fn get_result(&self, result_id: &ResultId) -> Result<Option<MatchResult>> {
        self.store.get_result(result_id)
    }

    /// Rating entries produced by a result
    pub fn ratings_for_result(&self, result_id: &ResultId) -> Result<Vec<Rating>> {
        self.store.ratings_for_result(result_id)
    }

    /// All results involving the player within the game, newest first
    pub fn results_for_player(
        &self,
        player_id: &str,
        game_id: GameId,
    ) -> Result<Vec<MatchResult>> {
        self.store
            .results_for_player(&LedgerKey::new(player_id, game_id))
    }

    /// Apply a staged batch atomically
    pub fn commit(&self, batch: LedgerBatch) -> Result<CommitReceipt> {
        self.store.commit(batch)
    }

    pub fn counts(&self) -> Result<LedgerCounts> {
        self.store.counts()
    }
}
