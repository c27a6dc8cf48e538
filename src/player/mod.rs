//! Player lookup
//!
//! Player registration lives outside this crate; this module only resolves
//! raw identifiers supplied with a match result.

pub mod provider;

pub use provider::{PlayerProvider, StaticPlayerProvider};
