//! Rating calculator trait
//!
//! This module defines the interface the result engine uses to turn two
//! pre-match ratings into two post-match ratings.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Ratings of both participants before and after one match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    pub winner_before: f64,
    pub loser_before: f64,
    pub winner_after: f64,
    pub loser_after: f64,
}

impl RatingUpdate {
    /// Points gained by the winner
    pub fn winner_delta(&self) -> f64 {
        self.winner_after - self.winner_before
    }

    /// Points lost by the loser (negative)
    pub fn loser_delta(&self) -> f64 {
        self.loser_after - self.loser_before
    }
}

/// Trait for calculating rating changes after a decided match
#[cfg_attr(test, mockall::automock)]
pub trait RatingCalculator: Send + Sync {
    /// Calculate post-match ratings from the two pre-match ratings
    ///
    /// # Arguments
    /// * `winner_before` - Current rating of the winner in the game
    /// * `loser_before` - Current rating of the loser in the game
    fn calculate(&self, winner_before: f64, loser_before: f64) -> Result<RatingUpdate>;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_update_deltas() {
        let update = RatingUpdate {
            winner_before: 1500.0,
            loser_before: 1500.0,
            winner_after: 1516.0,
            loser_after: 1484.0,
        };

        assert_eq!(update.winner_delta(), 16.0);
        assert_eq!(update.loser_delta(), -16.0);
    }

    #[test]
    fn test_mock_calculator_returns_programmed_update() {
        let mut calculator = MockRatingCalculator::new();
        calculator
            .expect_calculate()
            .withf(|winner, loser| *winner == 1500.0 && *loser == 1400.0)
            .times(1)
            .returning(|winner, loser| {
                Ok(RatingUpdate {
                    winner_before: winner,
                    loser_before: loser,
                    winner_after: winner + 1.0,
                    loser_after: loser - 1.0,
                })
            });

        let update = calculator.calculate(1500.0, 1400.0).unwrap();
        assert_eq!(update.winner_after, 1501.0);
        assert_eq!(update.loser_after, 1399.0);
    }
}
