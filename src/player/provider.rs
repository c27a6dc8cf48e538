//! Player provider traits and implementations
//!
//! Players are registered elsewhere; the engine only needs to turn a raw
//! identifier into a known `PlayerId`.

use crate::error::{LedgerError, Result};
use crate::types::PlayerId;
use std::collections::HashSet;
use std::sync::RwLock;

/// Trait for resolving raw identifiers to existing players
pub trait PlayerProvider: Send + Sync {
    /// Resolve a raw identifier; `None` when no such player exists
    fn resolve_player(&self, raw_id: &str) -> Result<Option<PlayerId>>;
}

/// Player provider backed by a fixed, in-memory set of ids
#[derive(Debug, Default)]
pub struct StaticPlayerProvider {
    players: RwLock<HashSet<PlayerId>>,
}

impl StaticPlayerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that knows the given players
    pub fn with_players<I, S>(players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PlayerId>,
    {
        Self {
            players: RwLock::new(players.into_iter().map(Into::into).collect()),
        }
    }

    /// Make a player known; returns false if it already was
    pub fn add_player(&self, player_id: impl Into<PlayerId>) -> Result<bool> {
        let mut players = self
            .players
            .write()
            .map_err(|_| LedgerError::InternalError {
                message: "Failed to acquire players write lock".to_string(),
            })?;

        Ok(players.insert(player_id.into()))
    }

    pub fn player_count(&self) -> Result<usize> {
        let players = self
            .players
            .read()
            .map_err(|_| LedgerError::InternalError {
                message: "Failed to acquire players read lock".to_string(),
            })?;

        Ok(players.len())
    }
}

impl PlayerProvider for StaticPlayerProvider {
    fn resolve_player(&self, raw_id: &str) -> Result<Option<PlayerId>> {
        let players = self
            .players
            .read()
            .map_err(|_| LedgerError::InternalError {
                message: "Failed to acquire players read lock".to_string(),
            })?;

        Ok(players.get(raw_id).cloned())
    }
}
