//! Elo rating system implementation
//!
//! Pairwise update: each side moves by `k * (actual - expected)`, where the
//! expected score follows the logistic curve with base 10 and the configured
//! scale. All arithmetic stays in `f64`; nothing is rounded before storage, so
//! the update is exactly zero-sum up to float addition and independent of which
//! side is computed first.

use crate::config::RatingConfig;
use crate::error::{LedgerError, Result};
use crate::rating::calculator::{RatingCalculator, RatingUpdate};

/// Expected score of a player against an opponent (0.0 to 1.0)
pub fn expected_score(rating: f64, opponent_rating: f64, scale: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent_rating - rating) / scale))
}

/// Elo rating calculator with configurable K factor and scale
#[derive(Debug, Clone, Default)]
pub struct EloRatingCalculator {
    config: RatingConfig,
}

impl EloRatingCalculator {
    /// Create a new Elo calculator
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn k_factor(&self) -> f64 {
        self.config.k_factor
    }

    pub fn scale(&self) -> f64 {
        self.config.scale
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn calculate(&self, winner_before: f64, loser_before: f64) -> Result<RatingUpdate> {
        if !winner_before.is_finite() || !loser_before.is_finite() {
            return Err(LedgerError::RatingCalculationFailed {
                reason: format!(
                    "non-finite input ratings: winner={}, loser={}",
                    winner_before, loser_before
                ),
            }
            .into());
        }

        let k = self.config.k_factor;
        let expected_winner = expected_score(winner_before, loser_before, self.config.scale);
        let expected_loser = 1.0 - expected_winner;

        let winner_after = winner_before + k * (1.0 - expected_winner);
        let loser_after = loser_before + k * (0.0 - expected_loser);

        if !winner_after.is_finite() || !loser_after.is_finite() {
            return Err(LedgerError::RatingCalculationFailed {
                reason: "rating update overflowed".to_string(),
            }
            .into());
        }

        Ok(RatingUpdate {
            winner_before,
            loser_before,
            winner_after,
            loser_after,
        })
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "default_rating": self.config.default_rating,
            "k_factor": self.config.k_factor,
            "scale": self.config.scale
        })
    }
}
