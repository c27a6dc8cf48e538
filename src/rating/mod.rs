//! Rating system using a pairwise Elo update
//!
//! This module provides the calculator interface consumed by the result
//! engine and the Elo implementation behind it.

pub mod calculator;
pub mod elo;

// Re-export commonly used types
pub use calculator::{RatingCalculator, RatingUpdate};
pub use elo::{expected_score, EloRatingCalculator};
