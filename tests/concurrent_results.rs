//! Concurrency tests for result creation and retraction
//!
//! Many threads record results against overlapping players; per-key locking
//! has to keep every read-compute-commit sequence isolated.

mod fixtures;

use rating_ledger::rating::{EloRatingCalculator, RatingCalculator};
use rating_ledger::ResultParams;
use std::sync::Arc;
use std::thread;

use fixtures::{create_test_system, rating, record};

const PLAYERS: [&str; 6] = ["p0", "p1", "p2", "p3", "p4", "p5"];

#[test]
fn test_concurrent_creates_conserve_rating_sum() {
    let (engine, game) = create_test_system(&PLAYERS);
    let engine = Arc::new(engine);
    let game = Arc::new(game);

    let threads = 8;
    let per_thread = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let engine = engine.clone();
            let game = game.clone();
            thread::spawn(move || {
                for i in 0..per_thread {
                    let winner = PLAYERS[(t + i) % PLAYERS.len()];
                    let loser = PLAYERS[(t + 2 * i + 1) % PLAYERS.len()];
                    if winner == loser {
                        continue;
                    }
                    let outcome = engine
                        .create(&game, &ResultParams::new(winner, loser))
                        .unwrap();
                    assert!(outcome.is_success());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let counts = engine.ledger().counts().unwrap();
    assert_eq!(counts.ratings, counts.results * 2);

    let total: f64 = PLAYERS.iter().map(|p| rating(&engine, &game, p)).sum();
    let expected = 1500.0 * PLAYERS.len() as f64;
    assert!(
        (total - expected).abs() < 1e-6,
        "rating sum drifted to {}",
        total
    );

    // A lost update would leave two entries built on the same baseline
    for player in PLAYERS {
        let history = engine.ledger().history(player, game.id).unwrap();
        let results = engine.ledger().results_for_player(player, game.id).unwrap();
        assert_eq!(history.len(), results.len());
        let ordered = history
            .windows(2)
            .all(|pair| pair[0].sequence < pair[1].sequence);
        assert!(ordered);
    }
}

#[test]
fn test_concurrent_hammering_of_one_pair() {
    let (engine, game) = create_test_system(&["alice", "bob"]);
    let engine = Arc::new(engine);
    let game = Arc::new(game);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = engine.clone();
            let game = game.clone();
            thread::spawn(move || {
                let (winner, loser) = if t % 2 == 0 {
                    ("alice", "bob")
                } else {
                    ("bob", "alice")
                };
                for _ in 0..25 {
                    record(&engine, &game, winner, loser);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let alice = engine.ledger().history("alice", game.id).unwrap();
    let bob = engine.ledger().history("bob", game.id).unwrap();
    assert_eq!(alice.len(), 100);
    assert_eq!(bob.len(), 100);

    // Every entry pair has to be computed from the pair directly before it
    let calculator = EloRatingCalculator::default();
    let (mut alice_before, mut bob_before) = (1500.0, 1500.0);
    for (a, b) in alice.iter().zip(bob.iter()) {
        assert_eq!(a.result_id, b.result_id);

        let result = engine.ledger().get_result(&a.result_id).unwrap().unwrap();
        if result.winner_id == "alice" {
            let update = calculator.calculate(alice_before, bob_before).unwrap();
            assert_eq!(a.value, update.winner_after);
            assert_eq!(b.value, update.loser_after);
        } else {
            let update = calculator.calculate(bob_before, alice_before).unwrap();
            assert_eq!(b.value, update.winner_after);
            assert_eq!(a.value, update.loser_after);
        }

        alice_before = a.value;
        bob_before = b.value;
    }
}

#[test]
fn test_concurrent_destroy_of_same_result_succeeds_once() {
    let (engine, game) = create_test_system(&["alice", "bob"]);
    let engine = Arc::new(engine);
    let result = Arc::new(record(&engine, &game, "alice", "bob"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let result = result.clone();
            thread::spawn(move || engine.destroy(&result).unwrap().is_success())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|succeeded| *succeeded)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(engine.ledger().counts().unwrap().results, 0);
}
