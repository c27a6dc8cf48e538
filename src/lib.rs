//! Rating Ledger - Elo ratings derived from an append-only match history
//!
//! This crate records pairwise match results per game, derives each player's
//! rating from an ordered per-(player, game) ledger, and only allows a result
//! to be retracted while it is still the latest one for both participants.

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod player;
pub mod rating;
pub mod results;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LedgerError, Result, ValidationError};
pub use types::*;

// Re-export key components
pub use ledger::{InMemoryLedgerStore, LedgerStore, RatingLedger};
pub use player::{PlayerProvider, StaticPlayerProvider};
pub use rating::{EloRatingCalculator, RatingCalculator};
pub use results::ResultEngine;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
