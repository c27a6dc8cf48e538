//! Per-key serialization of ledger work
//!
//! A fixed pool of mutex stripes; each `LedgerKey` hashes to one stripe.
//! Holding the stripes of both participants across read, compute and commit
//! makes the read-modify-append sequence atomic per (player, game).

use crate::error::{LedgerError, Result};
use crate::types::LedgerKey;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard};

/// Striped locks keyed by (player, game)
#[derive(Debug)]
pub struct KeyedLocks {
    stripes: Vec<Mutex<()>>,
}

/// Held stripes; released on drop
#[derive(Debug)]
pub struct KeyGuard<'a> {
    stripes: Vec<usize>,
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl KeyGuard<'_> {
    /// Indices of the stripes held, ascending
    pub fn stripes(&self) -> &[usize] {
        &self.stripes
    }
}

impl KeyedLocks {
    /// Create a pool with `stripes` locks (at least one)
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Stripe index a key maps to
    pub fn stripe_for(&self, key: &LedgerKey) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    /// Lock every stripe the keys map to
    ///
    /// Stripes are taken once each, in ascending order, so two callers locking
    /// overlapping key sets can never deadlock.
    pub fn lock_all(&self, keys: &[LedgerKey]) -> Result<KeyGuard<'_>> {
        let mut stripes: Vec<usize> = keys.iter().map(|key| self.stripe_for(key)).collect();
        stripes.sort_unstable();
        stripes.dedup();

        let mut guards = Vec::with_capacity(stripes.len());
        for &index in &stripes {
            let guard = self.stripes[index].lock().map_err(|_| {
                anyhow::Error::from(LedgerError::StorageUnavailable {
                    message: format!("Ledger key lock {} is poisoned", index),
                })
            })?;
            guards.push(guard);
        }

        Ok(KeyGuard {
            stripes,
            _guards: guards,
        })
    }
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new(64)
    }
}
