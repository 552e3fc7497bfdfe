//! Per-identifier mutual exclusion.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out one async lock per addon identifier.
///
/// Holding the guard returned by [`LeaseTable::acquire`] keeps every other
/// operation on the same identifier waiting; different identifiers never
/// contend.
#[derive(Debug, Default)]
pub struct LeaseTable {
    slots: DashMap<String, Arc<Mutex<()>>>,
}

impl LeaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, identifier: &str) -> OwnedMutexGuard<()> {
        // Only the table holds a reference to an idle slot.
        self.slots
            .retain(|key, slot| key == identifier || Arc::strong_count(slot) > 1);
        let slot = self.slots.entry(identifier.to_string()).or_default().clone();
        slot.lock_owned().await
    }

    /// Number of identifiers currently tracked.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
