//! Result engine
//!
//! Creates and retracts match results. A create reads both participants'
//! current ratings, runs the rating calculator and commits the result with
//! its two new rating entries in one batch. A destroy is only allowed for the
//! latest result of both participants, and removes the result and its two
//! entries in one batch. Both hold the participants' key locks from the first
//! read to the commit.

use crate::config::AppConfig;
use crate::error::{LedgerError, Result, ValidationError};
use crate::ledger::{CommitReceipt, KeyedLocks, LedgerBatch, RatingLedger};
use crate::metrics::{MetricsCollector, OPERATION_CREATE, OPERATION_DESTROY};
use crate::player::PlayerProvider;
use crate::rating::{EloRatingCalculator, RatingCalculator};
use crate::results::validation::{check_most_recent, validate_participants};
use crate::types::{Game, LedgerKey, MatchResult, Outcome, ResultParams};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Orchestrates creation and retraction of match results
#[derive(Clone)]
pub struct ResultEngine {
    ledger: RatingLedger,
    players: Arc<dyn PlayerProvider>,
    calculator: Arc<dyn RatingCalculator>,
    locks: Arc<KeyedLocks>,
    metrics: Arc<MetricsCollector>,
}

impl ResultEngine {
    /// Create a new result engine with its own metrics collector
    pub fn new(
        ledger: RatingLedger,
        players: Arc<dyn PlayerProvider>,
        calculator: Arc<dyn RatingCalculator>,
        locks: KeyedLocks,
    ) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        let engine = Self::with_metrics(ledger, players, calculator, locks, metrics);
        Ok(engine)
    }

    /// Create a new result engine with metrics collector
    pub fn with_metrics(
        ledger: RatingLedger,
        players: Arc<dyn PlayerProvider>,
        calculator: Arc<dyn RatingCalculator>,
        locks: KeyedLocks,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            ledger,
            players,
            calculator,
            locks: Arc::new(locks),
            metrics,
        }
    }

    /// Build an engine with an in-memory ledger and the Elo calculator
    pub fn from_config(config: &AppConfig, players: Arc<dyn PlayerProvider>) -> Result<Self> {
        let calculator = EloRatingCalculator::new(config.rating.clone())?;
        let ledger = RatingLedger::in_memory(config.rating.default_rating);

        Self::new(
            ledger,
            players,
            Arc::new(calculator),
            KeyedLocks::new(config.ledger.lock_stripes),
        )
    }

    pub fn ledger(&self) -> &RatingLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Current rating of a player in a game
    pub fn current_rating(&self, player_id: &str, game: &Game) -> Result<f64> {
        self.ledger.current_rating(player_id, game.id)
    }

    /// Record that `winner_id` beat `loser_id` in `game`
    ///
    /// Validation rejections come back as a failed `Outcome`; `Err` is
    /// reserved for storage and commit failures, in which case nothing was
    /// written.
    pub fn create(&self, game: &Game, params: &ResultParams) -> Result<Outcome<MatchResult>> {
        let timer = self.metrics.start_timer();

        let participants = match validate_participants(self.players.as_ref(), params)? {
            Ok(participants) => participants,
            Err(errors) => return Ok(self.reject(OPERATION_CREATE, errors)),
        };

        let keys = [
            LedgerKey::new(participants.winner_id.clone(), game.id),
            LedgerKey::new(participants.loser_id.clone(), game.id),
        ];
        let _guard = self.locks.lock_all(&keys)?;

        let winner_before = self
            .ledger
            .current_rating(&participants.winner_id, game.id)?;
        let loser_before = self
            .ledger
            .current_rating(&participants.loser_id, game.id)?;
        let update = self.calculator.calculate(winner_before, loser_before)?;

        let mut batch = LedgerBatch::new();
        let result_id =
            batch.insert_result(game.id, &participants.winner_id, &participants.loser_id);
        batch.append(
            result_id,
            &participants.winner_id,
            game.id,
            update.winner_after,
        );
        batch.append(
            result_id,
            &participants.loser_id,
            game.id,
            update.loser_after,
        );

        let receipt = self.commit(OPERATION_CREATE, batch)?;
        let result = receipt
            .results
            .into_iter()
            .find(|result| result.id == result_id)
            .ok_or_else(|| LedgerError::InternalError {
                message: format!("commit receipt is missing result {}", result_id),
            })?;

        info!(
            "Recorded result {} in {}: {} {:.2} -> {:.2}, {} {:.2} -> {:.2}",
            result.id, game.name, result.winner_id, update.winner_before, update.winner_after,
            result.loser_id, update.loser_before, update.loser_after
        );
        self.metrics
            .record_result_created(update.winner_delta(), timer.stop());

        Ok(Outcome::success(result))
    }

    /// Retract a result and the two rating entries it produced
    ///
    /// Only the latest result of both participants in its game can be
    /// retracted; anything older would leave later ratings computed from a
    /// baseline that no longer exists.
    pub fn destroy(&self, result: &MatchResult) -> Result<Outcome<()>> {
        let timer = self.metrics.start_timer();

        let keys = result.participant_keys();
        let _guard = self.locks.lock_all(&keys)?;

        if let Err(errors) = check_most_recent(&self.ledger, result)? {
            return Ok(self.reject(OPERATION_DESTROY, errors));
        }

        let ratings = self.ledger.ratings_for_result(&result.id)?;
        let mut batch = LedgerBatch::new();
        batch.delete_result(result.id);
        for rating in &ratings {
            batch.remove(rating.id);
        }

        let receipt = self.commit(OPERATION_DESTROY, batch)?;

        info!(
            "Retracted result {} ({} beat {}), removed {} rating entries",
            result.id,
            result.winner_id,
            result.loser_id,
            receipt.removed_ratings.len()
        );
        self.metrics.record_result_destroyed(timer.stop());

        Ok(Outcome::success(()))
    }

    fn commit(&self, operation: &str, batch: LedgerBatch) -> Result<CommitReceipt> {
        debug!("Committing {} batch with {} ops", operation, batch.len());

        self.ledger.commit(batch).map_err(|err| {
            error!("Ledger commit for {} failed: {:#}", operation, err);
            self.metrics.record_commit_failure(operation);
            err
        })
    }

    fn reject<T>(&self, operation: &str, errors: Vec<ValidationError>) -> Outcome<T> {
        for error in &errors {
            self.metrics
                .record_validation_failure(operation, error.reason());
        }

        let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
        warn!("Rejected {} request: {}", operation, reasons.join("; "));

        Outcome::failure(errors)
    }
}
