//! Utility functions for the rating ledger

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique result ID
pub fn generate_result_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique rating entry ID
pub fn generate_rating_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Normalize a raw participant id; blank ids count as absent
pub fn normalize_raw_id(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|id| !id.is_empty())
}
