//! Rating system configuration

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// Tunable constants of the Elo update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating used for a player with no history in a game
    pub default_rating: f64,
    /// Step size applied to the difference between actual and expected score
    pub k_factor: f64,
    /// Rating difference at which the stronger side is ten times as likely to win
    pub scale: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            default_rating: 1500.0,
            k_factor: 32.0,
            scale: 400.0,
        }
    }
}

impl RatingConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.default_rating.is_finite() {
            return Err(LedgerError::ConfigurationError {
                message: "Default rating must be finite".to_string(),
            }
            .into());
        }

        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(LedgerError::ConfigurationError {
                message: "K factor must be positive".to_string(),
            }
            .into());
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(LedgerError::ConfigurationError {
                message: "Scale must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
