//! Error types for the rating ledger
//!
//! Two families live here. `ValidationError` describes expected rejections that
//! are reported back inside an [`Outcome`](crate::types::Outcome); `LedgerError`
//! describes infrastructure failures that surface as `Err` through anyhow.

use crate::types::{ParticipantRole, PlayerId, ResultId};
use serde::{Deserialize, Serialize};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Rejections produced while validating a create or destroy request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("missing participant: {role} id is absent")]
    MissingParticipant { role: ParticipantRole },

    #[error("unknown player: {role} id {raw_id:?} does not resolve")]
    UnknownPlayer {
        role: ParticipantRole,
        raw_id: String,
    },

    #[error("winner equals loser: {player_id}")]
    WinnerEqualsLoser { player_id: PlayerId },

    #[error("not most recent: result {result_id} is not the latest result for {player_id}")]
    NotMostRecent {
        result_id: ResultId,
        player_id: PlayerId,
    },
}

impl ValidationError {
    /// Stable label used for metrics and structured logs
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingParticipant { .. } => "missing_participant",
            ValidationError::UnknownPlayer { .. } => "unknown_player",
            ValidationError::WinnerEqualsLoser { .. } => "winner_equals_loser",
            ValidationError::NotMostRecent { .. } => "not_most_recent",
        }
    }
}

/// Infrastructure failures that cannot be recovered at this layer
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Atomic commit failed: {reason}")]
    CommitFailed { reason: String },

    #[error("Rating calculation failed: {reason}")]
    RatingCalculationFailed { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal ledger error: {message}")]
    InternalError { message: String },
}
