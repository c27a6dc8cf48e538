//! Rating ledger: ordered, append-only rating histories per (player, game)
//!
//! This module provides the storage interface, the in-memory store, staged
//! atomic batches and the per-key locks used by the result engine.

pub mod batch;
pub mod locks;
pub mod rating_ledger;
pub mod storage;

// Re-export commonly used types
pub use batch::{CommitReceipt, LedgerBatch, LedgerOp};
pub use locks::{KeyGuard, KeyedLocks};
pub use rating_ledger::RatingLedger;
pub use storage::{InMemoryLedgerStore, LedgerCounts, LedgerStore};
