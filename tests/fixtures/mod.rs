//! Test fixtures and provider implementations for integration testing

#![allow(dead_code)]

use rating_ledger::config::AppConfig;
use rating_ledger::error::Result;
use rating_ledger::{
    Game, MatchResult, PlayerId, PlayerProvider, ResultEngine, ResultParams, StaticPlayerProvider,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Player provider that resolves aliases and counts lookups
#[derive(Debug, Default)]
pub struct AliasPlayerProvider {
    aliases: HashMap<String, PlayerId>,
    lookups: Mutex<Vec<String>>,
}

impl AliasPlayerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player reachable under its own id and every alias
    pub fn with_player(mut self, player_id: &str, aliases: &[&str]) -> Self {
        self.aliases
            .insert(player_id.to_string(), player_id.to_string());
        for alias in aliases {
            self.aliases
                .insert(alias.to_string(), player_id.to_string());
        }
        self
    }

    /// Raw ids seen so far, in lookup order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .map(|lookups| lookups.clone())
            .unwrap_or_default()
    }
}

impl PlayerProvider for AliasPlayerProvider {
    fn resolve_player(&self, raw_id: &str) -> Result<Option<PlayerId>> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(raw_id.to_string());
        }
        Ok(self.aliases.get(raw_id).cloned())
    }
}

/// Integration test setup with the default Elo configuration
pub fn create_test_system(players: &[&str]) -> (ResultEngine, Game) {
    create_test_system_with_config(&AppConfig::default(), players)
}

pub fn create_test_system_with_config(
    config: &AppConfig,
    players: &[&str],
) -> (ResultEngine, Game) {
    let provider = StaticPlayerProvider::with_players(players.iter().copied());
    let engine = ResultEngine::from_config(config, Arc::new(provider)).unwrap();
    (engine, Game::new("chess"))
}

/// Record a result that is expected to pass validation
pub fn record(engine: &ResultEngine, game: &Game, winner: &str, loser: &str) -> MatchResult {
    let outcome = engine
        .create(game, &ResultParams::new(winner, loser))
        .unwrap();
    assert!(
        outcome.is_success(),
        "{} beating {} was rejected: {:?}",
        winner,
        loser,
        outcome.errors()
    );
    outcome.into_value().unwrap()
}

pub fn rating(engine: &ResultEngine, game: &Game, player: &str) -> f64 {
    engine.current_rating(player, game).unwrap()
}
