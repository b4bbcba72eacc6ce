//! Per-owner serialization of ledger writes.
//!
//! Running totals are derived from the owner's latest entry, so the
//! read-latest, compute, write sequence must not interleave for one owner.

use std::sync::Arc;

use dashmap::DashMap;
use moneybook_shared::types::OwnerId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Table of async mutexes keyed by owner.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    locks: DashMap<OwnerId, Arc<Mutex<()>>>,
}

impl OwnerLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the owner's ledger.
    ///
    /// The returned guard releases the lock when dropped.
    pub async fn acquire(&self, owner_id: OwnerId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(owner_id).or_default().value());
        lock.lock_owned().await
    }

    /// Number of owners that have taken a lock so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no owner has taken a lock yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
