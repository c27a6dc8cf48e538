//! Command line entry point for the rating ledger
//!
//! Replays a JSON match log through the result engine, retracts the requested
//! results and prints the final standings.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rating_ledger::config::AppConfig;
use rating_ledger::{Game, MatchResult, ResultEngine, ResultParams, StaticPlayerProvider};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Rating Ledger - Elo ratings from an append-only match history
#[derive(Parser)]
#[command(
    name = "rating-ledger",
    version,
    about = "Replay match results into a per-game Elo rating ledger",
    long_about = "Rating Ledger records pairwise match results per game, derives Elo ratings \
                 from an append-only per-player history and only retracts results that are \
                 still the latest for both participants."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(
        short,
        long,
        global = true,
        help = "Enable debug mode with verbose logging"
    )]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, global = true, help = "Validate configuration and exit")]
    dry_run: bool,

    /// Print metrics after the run
    #[arg(long, global = true, help = "Print metrics after the run")]
    metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON match log
    Replay {
        /// Match log to replay
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Match log consumed by `replay`
#[derive(Debug, Deserialize)]
struct MatchLog {
    game: String,
    players: Vec<String>,
    #[serde(default)]
    results: Vec<ResultParams>,
    /// Indices into `results` to retract, in order
    #[serde(default)]
    retract: Vec<usize>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration and apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    rating_ledger::config::validate_config(&config)?;
    Ok(config)
}

fn display_banner(config: &AppConfig) {
    info!("Rating Ledger v{}", rating_ledger::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Elo: default {}, K {}, scale {}",
        config.rating.default_rating, config.rating.k_factor, config.rating.scale
    );
    info!("   Lock stripes: {}", config.ledger.lock_stripes);
}

fn read_match_log(path: &Path) -> Result<MatchLog> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read match log {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid match log {}", path.display()))
}

/// Run every result of the log through the engine, then retract
fn replay(config: &AppConfig, path: &Path, print_metrics: bool) -> Result<()> {
    let log = read_match_log(path)?;
    let players = StaticPlayerProvider::with_players(log.players.iter().cloned());
    let engine = ResultEngine::from_config(config, Arc::new(players))?;
    let game = Game::new(log.game.clone());

    info!(
        "Replaying {} results for {} players in {}",
        log.results.len(),
        log.players.len(),
        game.name
    );

    let mut created: Vec<Option<MatchResult>> = Vec::with_capacity(log.results.len());
    for (index, params) in log.results.iter().enumerate() {
        let outcome = engine.create(&game, params)?;
        if !outcome.is_success() {
            warn!("Result #{} rejected: {:?}", index, outcome.errors());
        }
        created.push(outcome.into_value());
    }

    for index in &log.retract {
        let Some(Some(result)) = created.get(*index) else {
            warn!("Result #{} was never recorded, nothing to retract", index);
            continue;
        };

        let outcome = engine.destroy(result)?;
        if outcome.is_success() {
            created[*index] = None;
        } else {
            warn!(
                "Retraction of result #{} rejected: {:?}",
                index,
                outcome.errors()
            );
        }
    }

    let mut standings = Vec::with_capacity(log.players.len());
    for player in &log.players {
        let rating = engine.current_rating(player, &game)?;
        let played = engine.ledger().history(player, game.id)?.len();
        standings.push((player.as_str(), rating, played));
    }
    standings.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    println!("Standings for {}", game.name);
    for (rank, (player, rating, played)) in standings.iter().enumerate() {
        let position = rank + 1;
        println!(
            "{:>3}. {:<20} {:>9.2} ({} games)",
            position, player, rating, played
        );
    }

    let counts = engine.ledger().counts()?;
    println!(
        "{} results, {} rating entries across {} histories",
        counts.results, counts.ratings, counts.histories
    );

    if print_metrics {
        print!("{}", engine.metrics().render()?);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        return Ok(());
    }

    match &args.command {
        Some(Command::Replay { file }) => {
            if let Err(e) = replay(&config, file, args.metrics) {
                error!("Replay failed: {:#}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        None => Err(anyhow!("No command given, see --help")),
    }
}
