//! Configuration management for the rating ledger
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for the rating engine.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, LedgerSettings, ServiceSettings};
pub use rating::RatingConfig;
