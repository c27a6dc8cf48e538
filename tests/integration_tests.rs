//! Integration tests for the rating ledger
//!
//! These tests drive the result engine end to end:
//! - Rating updates across sequences of results
//! - Validation rejections and their ordering
//! - Ledger linkage between results and rating entries
//! - Guarded retraction of results

// Modules for organizing tests
mod fixtures;

use rating_ledger::config::AppConfig;
use rating_ledger::rating::{EloRatingCalculator, RatingCalculator};
use rating_ledger::{
    Game, ParticipantRole, ResultEngine, ResultParams, StaticPlayerProvider, ValidationError,
};
use std::collections::BTreeSet;
use std::sync::Arc;

use fixtures::{
    create_test_system, create_test_system_with_config, rating, record, AliasPlayerProvider,
};

const DEFAULT: f64 = 1500.0;

#[test]
fn test_single_result_moves_ratings_apart() {
    let (engine, game) = create_test_system(&["alice", "bob"]);

    assert_eq!(rating(&engine, &game, "alice"), DEFAULT);
    assert_eq!(rating(&engine, &game, "bob"), DEFAULT);

    record(&engine, &game, "alice", "bob");

    let alice = rating(&engine, &game, "alice");
    let bob = rating(&engine, &game, "bob");
    assert!(alice > DEFAULT && DEFAULT > bob);
    assert!((alice - 1516.0).abs() < 1e-9);
    assert!((bob - 1484.0).abs() < 1e-9);
}

#[test]
fn test_rematch_stores_exact_calculator_output() {
    let (engine, game) = create_test_system(&["alice", "bob"]);
    let calculator = EloRatingCalculator::default();

    record(&engine, &game, "alice", "bob");
    record(&engine, &game, "bob", "alice");

    let first = calculator.calculate(DEFAULT, DEFAULT).unwrap();
    let second = calculator
        .calculate(first.loser_after, first.winner_after)
        .unwrap();

    assert_eq!(rating(&engine, &game, "bob"), second.winner_after);
    assert_eq!(rating(&engine, &game, "alice"), second.loser_after);
}

/// After A beats B and B beats A the ratings are not equal again. With K = 32
/// they end at about 1498.53 and 1501.47, because B's win came against a
/// higher-rated A. The rematch still conserves the rating sum, mirrors
/// exactly when the order of wins is swapped and keeps full precision.
#[test]
fn test_rematch_leaves_unequal_zero_sum_ratings() {
    let (engine, game) = create_test_system(&["alice", "bob"]);
    record(&engine, &game, "alice", "bob");
    record(&engine, &game, "bob", "alice");

    let (mirror, mirror_game) = create_test_system(&["alice", "bob"]);
    record(&mirror, &mirror_game, "bob", "alice");
    record(&mirror, &mirror_game, "alice", "bob");

    let alice = rating(&engine, &game, "alice");
    let bob = rating(&engine, &game, "bob");

    // The last winner ends ahead
    assert!((alice - 1498.5304984710244).abs() < 1e-9);
    assert!((bob - 1501.4695015289756).abs() < 1e-9);

    // Nobody gains or loses points overall
    assert!((alice + bob - 2.0 * DEFAULT).abs() < 1e-9);

    // Who won first does not matter, only who won last
    assert_eq!(alice, rating(&mirror, &mirror_game, "bob"));
    assert_eq!(bob, rating(&mirror, &mirror_game, "alice"));

    // The ratings are stored unrounded
    assert_ne!(alice, alice.round());
    assert_ne!(bob, bob.round());
}

#[test]
fn test_winner_gains_from_any_baseline() {
    let (engine, game) = create_test_system(&["alice", "bob", "carol"]);

    for (winner, loser) in [
        ("alice", "bob"),
        ("alice", "bob"),
        ("alice", "carol"),
        ("bob", "alice"),
        ("carol", "bob"),
        ("carol", "bob"),
    ] {
        let winner_before = rating(&engine, &game, winner);
        let loser_before = rating(&engine, &game, loser);

        record(&engine, &game, winner, loser);

        assert!(rating(&engine, &game, winner) > winner_before);
        assert!(rating(&engine, &game, loser) < loser_before);
    }
}

#[test]
fn test_identical_players_rejected() {
    let (engine, game) = create_test_system(&["alice", "bob"]);

    let outcome = engine
        .create(&game, &ResultParams::new("alice", "alice"))
        .unwrap();

    assert!(!outcome.is_success());
    assert!(outcome.value().is_none());
    assert_eq!(
        outcome.errors(),
        &[ValidationError::WinnerEqualsLoser {
            player_id: "alice".to_string()
        }]
    );
    assert_eq!(engine.ledger().counts().unwrap().results, 0);
}

#[test]
fn test_missing_participant_rejected_on_either_side() {
    let (engine, game) = create_test_system(&["alice", "bob"]);

    let cases = [
        (Some("alice"), None, ParticipantRole::Loser),
        (None, Some("alice"), ParticipantRole::Winner),
        (Some("alice"), Some(""), ParticipantRole::Loser),
    ];

    for (winner, loser, role) in cases {
        let params = ResultParams {
            winner_id: winner.map(str::to_string),
            loser_id: loser.map(str::to_string),
        };
        let outcome = engine.create(&game, &params).unwrap();

        assert!(!outcome.is_success());
        assert_eq!(
            outcome.errors(),
            &[ValidationError::MissingParticipant { role }]
        );
    }

    assert_eq!(engine.ledger().counts().unwrap().ratings, 0);
}

#[test]
fn test_unknown_players_reported_together() {
    let (engine, game) = create_test_system(&["alice"]);

    let outcome = engine
        .create(&game, &ResultParams::new("mallory", "trent"))
        .unwrap();

    assert_eq!(
        outcome
            .errors()
            .iter()
            .map(ValidationError::reason)
            .collect::<Vec<_>>(),
        vec!["unknown_player", "unknown_player"]
    );
    assert_eq!(
        outcome.errors()[0],
        ValidationError::UnknownPlayer {
            role: ParticipantRole::Winner,
            raw_id: "mallory".to_string()
        }
    );
}

#[test]
fn test_missing_participant_skips_player_lookup() {
    let provider = Arc::new(AliasPlayerProvider::new().with_player("alice", &[]));
    let engine = ResultEngine::from_config(&AppConfig::default(), provider.clone()).unwrap();
    let game = Game::new("go");

    let params = ResultParams {
        winner_id: Some("alice".to_string()),
        loser_id: None,
    };
    assert!(!engine.create(&game, &params).unwrap().is_success());
    assert!(provider.lookups().is_empty());
}

#[test]
fn test_aliases_resolve_to_the_same_history() {
    let provider = Arc::new(
        AliasPlayerProvider::new()
            .with_player("alice", &["Alice", "@alice"])
            .with_player("bob", &["Bob"]),
    );
    let engine = ResultEngine::from_config(&AppConfig::default(), provider.clone()).unwrap();
    let game = Game::new("go");

    let result = record(&engine, &game, "Alice", "Bob");
    assert_eq!(result.winner_id, "alice");
    assert_eq!(result.loser_id, "bob");
    assert_eq!(provider.lookups(), vec!["Alice", "Bob"]);

    // Two spellings of one player cannot play each other
    let outcome = engine
        .create(&game, &ResultParams::new("@alice", "alice"))
        .unwrap();
    assert_eq!(outcome.errors()[0].reason(), "winner_equals_loser");

    assert_eq!(engine.ledger().history("alice", game.id).unwrap().len(), 1);
}

#[test]
fn test_result_links_exactly_two_ratings() {
    let (engine, game) = create_test_system(&["alice", "bob"]);
    let counts_before = engine.ledger().counts().unwrap();

    let result = record(&engine, &game, "alice", "bob");

    let expected: BTreeSet<String> = ["alice".to_string(), "bob".to_string()].into();
    assert_eq!(result.player_ids, expected);

    let ratings = engine.ledger().ratings_for_result(&result.id).unwrap();
    assert_eq!(ratings.len(), 2);
    for entry in &ratings {
        assert_eq!(entry.game_id, game.id);
        assert_eq!(entry.result_id, result.id);
    }

    let owners: BTreeSet<String> = ratings.iter().map(|r| r.player_id.clone()).collect();
    assert_eq!(owners, expected);

    let counts_after = engine.ledger().counts().unwrap();
    assert_eq!(counts_after.results, counts_before.results + 1);
    assert_eq!(counts_after.ratings, counts_before.ratings + 2);
}

#[test]
fn test_games_keep_separate_ledgers() {
    let (engine, chess) = create_test_system(&["alice", "bob"]);
    let go = Game::new("go");

    record(&engine, &chess, "alice", "bob");
    record(&engine, &go, "bob", "alice");

    assert!(rating(&engine, &chess, "alice") > DEFAULT);
    assert!(rating(&engine, &go, "alice") < DEFAULT);
    assert_eq!(
        engine
            .ledger()
            .latest_result_for("alice", chess.id)
            .unwrap(),
        engine
            .ledger()
            .results_for_player("alice", chess.id)
            .unwrap()
            .first()
            .map(|result| result.id)
    );
}

#[test]
fn test_results_for_player_newest_first() {
    let (engine, game) = create_test_system(&["alice", "bob", "carol"]);

    let first = record(&engine, &game, "alice", "bob");
    let second = record(&engine, &game, "carol", "alice");
    let unrelated = record(&engine, &game, "bob", "carol");

    let ids: Vec<_> = engine
        .ledger()
        .results_for_player("alice", game.id)
        .unwrap()
        .into_iter()
        .map(|result| result.id)
        .collect();

    assert_eq!(ids, vec![second.id, first.id]);
    assert!(!ids.contains(&unrelated.id));
}

#[test]
fn test_destroy_latest_result() {
    let (engine, game) = create_test_system(&["alice", "bob"]);

    let result = record(&engine, &game, "alice", "bob");
    let outcome = engine.destroy(&result).unwrap();

    assert!(outcome.is_success());
    assert!(engine.ledger().get_result(&result.id).unwrap().is_none());
    assert!(engine
        .ledger()
        .ratings_for_result(&result.id)
        .unwrap()
        .is_empty());
    assert_eq!(rating(&engine, &game, "alice"), DEFAULT);
    assert_eq!(rating(&engine, &game, "bob"), DEFAULT);
    assert_eq!(engine.ledger().counts().unwrap().ratings, 0);
}

#[test]
fn test_destroy_restores_previous_ratings() {
    let (engine, game) = create_test_system(&["alice", "bob"]);

    record(&engine, &game, "alice", "bob");
    let alice_before = rating(&engine, &game, "alice");
    let bob_before = rating(&engine, &game, "bob");

    let rematch = record(&engine, &game, "bob", "alice");
    assert!(engine.destroy(&rematch).unwrap().is_success());

    assert_eq!(rating(&engine, &game, "alice"), alice_before);
    assert_eq!(rating(&engine, &game, "bob"), bob_before);
}

#[test]
fn test_destroy_rejects_non_latest_result() {
    let (engine, game) = create_test_system(&["alice", "bob", "carol"]);

    let r1 = record(&engine, &game, "alice", "bob");
    let r2 = record(&engine, &game, "alice", "carol");

    let outcome = engine.destroy(&r1).unwrap();
    assert!(!outcome.is_success());
    assert_eq!(
        outcome.errors(),
        &[ValidationError::NotMostRecent {
            result_id: r1.id,
            player_id: "alice".to_string()
        }]
    );
    let stored = engine.ledger().get_result(&r1.id).unwrap();
    assert_eq!(stored, Some(r1.clone()));
    let linked = engine.ledger().ratings_for_result(&r1.id).unwrap();
    assert_eq!(linked.len(), 2);

    // Unwinding newest first works
    assert!(engine.destroy(&r2).unwrap().is_success());
    assert!(engine.destroy(&r1).unwrap().is_success());
    assert_eq!(engine.ledger().counts().unwrap().results, 0);
}

#[test]
fn test_destroy_twice_fails() {
    let (engine, game) = create_test_system(&["alice", "bob"]);

    let result = record(&engine, &game, "alice", "bob");
    assert!(engine.destroy(&result).unwrap().is_success());

    let again = engine.destroy(&result).unwrap();
    assert!(!again.is_success());
    assert_eq!(again.errors().len(), 2);
}

#[test]
fn test_configured_k_factor_and_default() {
    let mut config = AppConfig::default();
    config.rating.k_factor = 16.0;
    config.rating.default_rating = 1200.0;

    let (engine, game) = create_test_system_with_config(&config, &["alice", "bob"]);
    assert_eq!(rating(&engine, &game, "alice"), 1200.0);

    record(&engine, &game, "alice", "bob");
    assert!((rating(&engine, &game, "alice") - 1208.0).abs() < 1e-9);
    assert!((rating(&engine, &game, "bob") - 1192.0).abs() < 1e-9);
}

#[test]
fn test_engine_metrics_track_outcomes() {
    let provider = Arc::new(StaticPlayerProvider::with_players(["alice", "bob"]));
    let engine = ResultEngine::from_config(&AppConfig::default(), provider).unwrap();
    let game = Game::new("chess");

    let result = record(&engine, &game, "alice", "bob");
    engine
        .create(&game, &ResultParams::new("alice", "alice"))
        .unwrap();
    engine.destroy(&result).unwrap();

    let text = engine.metrics().render().unwrap();
    assert!(text.contains("rating_ledger_results_created_total 1"));
    assert!(text.contains("rating_ledger_results_destroyed_total 1"));
    assert!(text.contains("reason=\"winner_equals_loser\""));
}
