//! Validation of result requests
//!
//! Every check returns an outer `Result` for infrastructure failures and an
//! inner [`Validation`] carrying the ordered rejection list.

use crate::error::{LedgerError, Result, ValidationError};
use crate::ledger::RatingLedger;
use crate::player::PlayerProvider;
use crate::types::{MatchResult, ParticipantRole, PlayerId, ResultParams};
use crate::utils::normalize_raw_id;

/// Either the validated value or every rejection of the failing stage
pub type Validation<T> = std::result::Result<T, Vec<ValidationError>>;

const ROLES: [ParticipantRole; 2] = [ParticipantRole::Winner, ParticipantRole::Loser];

/// Resolved, distinct participants of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participants {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
}

/// Check presence, existence and distinctness of both participants, in that order
///
/// A stage reports both sides before the next stage runs; later stages are
/// skipped once one fails.
pub fn validate_participants(
    players: &dyn PlayerProvider,
    params: &ResultParams,
) -> Result<Validation<Participants>> {
    let mut raw_ids = Vec::with_capacity(2);
    let mut errors = Vec::new();
    for role in ROLES {
        match normalize_raw_id(params.raw_id(role)) {
            Some(raw_id) => raw_ids.push((role, raw_id)),
            None => errors.push(ValidationError::MissingParticipant { role }),
        }
    }
    if !errors.is_empty() {
        return Ok(Err(errors));
    }

    let mut resolved = Vec::with_capacity(2);
    for (role, raw_id) in raw_ids {
        match players.resolve_player(raw_id)? {
            Some(player_id) => resolved.push(player_id),
            None => errors.push(ValidationError::UnknownPlayer {
                role,
                raw_id: raw_id.to_string(),
            }),
        }
    }
    if !errors.is_empty() {
        return Ok(Err(errors));
    }

    let [winner_id, loser_id]: [PlayerId; 2] =
        resolved
            .try_into()
            .map_err(|_| LedgerError::InternalError {
                message: "participant resolution lost a player".to_string(),
            })?;

    if winner_id == loser_id {
        return Ok(Err(vec![ValidationError::WinnerEqualsLoser {
            player_id: winner_id,
        }]));
    }

    Ok(Ok(Participants {
        winner_id,
        loser_id,
    }))
}

/// Check that the result is the latest one for both of its participants
pub fn check_most_recent(ledger: &RatingLedger, result: &MatchResult) -> Result<Validation<()>> {
    let mut errors = Vec::new();

    for player_id in [&result.winner_id, &result.loser_id] {
        if ledger.latest_result_for(player_id, result.game_id)? != Some(result.id) {
            errors.push(ValidationError::NotMostRecent {
                result_id: result.id,
                player_id: player_id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(Ok(()))
    } else {
        Ok(Err(errors))
    }
}
