//! Common types used throughout the rating ledger

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for games
pub type GameId = Uuid;

/// Unique identifier for match results
pub type ResultId = Uuid;

/// Unique identifier for rating ledger entries
pub type RatingId = Uuid;

/// Side of a match a participant played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Winner,
    Loser,
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipantRole::Winner => write!(f, "winner"),
            ParticipantRole::Loser => write!(f, "loser"),
        }
    }
}

/// A game under which ratings and results are partitioned
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
}

impl Game {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Key of one ordered rating history
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerKey {
    pub player_id: PlayerId,
    pub game_id: GameId,
}

impl LedgerKey {
    pub fn new(player_id: impl Into<PlayerId>, game_id: GameId) -> Self {
        Self {
            player_id: player_id.into(),
            game_id,
        }
    }
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.player_id, self.game_id)
    }
}

/// Immutable record of one match outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: ResultId,
    pub game_id: GameId,
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    /// Unordered set {winner_id, loser_id}, used for reverse lookup
    pub player_ids: BTreeSet<PlayerId>,
    /// Store-assigned commit position; defines "most recent"
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl MatchResult {
    /// Whether the player took part in this match
    pub fn involves(&self, player_id: &str) -> bool {
        self.player_ids.contains(player_id)
    }

    /// Ledger keys of both participants, winner first
    pub fn participant_keys(&self) -> [LedgerKey; 2] {
        [
            LedgerKey::new(self.winner_id.clone(), self.game_id),
            LedgerKey::new(self.loser_id.clone(), self.game_id),
        ]
    }
}

/// One point in a player's rating history within a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    /// The result whose existence justifies this entry
    pub result_id: ResultId,
    pub player_id: PlayerId,
    pub game_id: GameId,
    pub value: f64,
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.player_id.clone(), self.game_id)
    }
}

/// Raw participant identifiers as handed over by a request layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultParams {
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
}

impl ResultParams {
    pub fn new(winner_id: impl Into<String>, loser_id: impl Into<String>) -> Self {
        Self {
            winner_id: Some(winner_id.into()),
            loser_id: Some(loser_id.into()),
        }
    }

    /// Raw id for one side of the match
    pub fn raw_id(&self, role: ParticipantRole) -> Option<&str> {
        match role {
            ParticipantRole::Winner => self.winner_id.as_deref(),
            ParticipantRole::Loser => self.loser_id.as_deref(),
        }
    }
}

/// Outcome of an engine operation
///
/// `value` is present iff `success`; `errors` is non-empty iff not `success`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    success: bool,
    value: Option<T>,
    errors: Vec<ValidationError>,
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            errors: Vec::new(),
        }
    }

    /// Build a rejected outcome; callers always pass at least one error
    pub fn failure(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty(), "failed outcome without errors");
        Self {
            success: false,
            value: None,
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Convert into a standard result, keeping the ordered error list
    pub fn into_result(self) -> std::result::Result<T, Vec<ValidationError>> {
        match self.value {
            Some(value) if self.success => Ok(value),
            _ => Err(self.errors),
        }
    }
}
