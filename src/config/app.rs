//! Main application configuration
//!
//! This module defines the primary configuration structures for the rating
//! ledger, including environment variable loading, TOML files and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub ledger: LedgerSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Ledger storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Number of lock stripes used to serialize work per (player, game)
    pub lock_stripes: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rating-ledger".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self { lock_stripes: 64 }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(default_rating) = env::var("RATING_DEFAULT") {
            config.rating.default_rating = default_rating
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_DEFAULT value: {}", default_rating))?;
        }
        if let Ok(k_factor) = env::var("RATING_K_FACTOR") {
            config.rating.k_factor = k_factor
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_K_FACTOR value: {}", k_factor))?;
        }
        if let Ok(scale) = env::var("RATING_SCALE") {
            config.rating.scale = scale
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_SCALE value: {}", scale))?;
        }

        // Ledger settings
        if let Ok(stripes) = env::var("LEDGER_LOCK_STRIPES") {
            config.ledger.lock_stripes = stripes
                .parse()
                .map_err(|_| anyhow!("Invalid LEDGER_LOCK_STRIPES value: {}", stripes))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;

    if config.ledger.lock_stripes == 0 {
        return Err(anyhow!("Lock stripe count must be greater than 0"));
    }

    Ok(())
}
