//! Result engine: validated creation and guarded retraction of match results
//!
//! This module ties the player lookup, the rating ledger and the rating
//! calculator together behind `create` and `destroy`.

pub mod engine;
pub mod validation;

// Re-export commonly used types
pub use engine::ResultEngine;
pub use validation::{Participants, Validation};
