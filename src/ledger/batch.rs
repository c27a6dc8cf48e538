//! Staged ledger writes
//!
//! A `LedgerBatch` collects result inserts, rating appends and their removals.
//! Nothing in a batch is visible to readers until the store commits it, and a
//! store commits either every operation or none.

use crate::types::{GameId, MatchResult, PlayerId, Rating, RatingId, ResultId};
use crate::utils::{generate_rating_id, generate_result_id};
use serde::{Deserialize, Serialize};

/// A result waiting to be committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResult {
    pub id: ResultId,
    pub game_id: GameId,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
}

/// A rating entry waiting to be committed as the new latest of its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRating {
    pub id: RatingId,
    pub result_id: ResultId,
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub value: f64,
}

/// One staged write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerOp {
    InsertResult(NewResult),
    AppendRating(NewRating),
    DeleteResult(ResultId),
    RemoveRating(RatingId),
}

/// Ordered set of writes applied as a single transactional unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerBatch {
    ops: Vec<LedgerOp>,
}

impl LedgerBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new result and return the id it will be stored under
    pub fn insert_result(
        &mut self,
        game_id: GameId,
        winner_id: impl Into<PlayerId>,
        loser_id: impl Into<PlayerId>,
    ) -> ResultId {
        let id = generate_result_id();
        self.ops.push(LedgerOp::InsertResult(NewResult {
            id,
            game_id,
            winner_id: winner_id.into(),
            loser_id: loser_id.into(),
        }));
        id
    }

    /// Stage a new latest rating for (player, game), justified by `result_id`
    pub fn append(
        &mut self,
        result_id: ResultId,
        player_id: impl Into<PlayerId>,
        game_id: GameId,
        value: f64,
    ) -> RatingId {
        let id = generate_rating_id();
        self.ops.push(LedgerOp::AppendRating(NewRating {
            id,
            result_id,
            player_id: player_id.into(),
            game_id,
            value,
        }));
        id
    }

    /// Stage deletion of a result
    pub fn delete_result(&mut self, result_id: ResultId) {
        self.ops.push(LedgerOp::DeleteResult(result_id));
    }

    /// Stage deletion of a rating entry
    ///
    /// The ledger does not check that the entry is the latest of its history.
    pub fn remove(&mut self, rating_id: RatingId) {
        self.ops.push(LedgerOp::RemoveRating(rating_id));
    }

    pub fn ops(&self) -> &[LedgerOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<LedgerOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// What a successful commit made visible or removed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub results: Vec<MatchResult>,
    pub ratings: Vec<Rating>,
    pub deleted_results: Vec<ResultId>,
    pub removed_ratings: Vec<RatingId>,
}
