//! Per-id async lock table
//!
//! Only consulted when `ServiceConfig::serialize_same_id` is set. An entry
//! lives as long as some caller holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Table = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Default)]
pub(crate) struct IdLocks {
    table: Mutex<Table>,
}

impl IdLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // The table is only touched for map bookkeeping, so a poisoned guard
    // still holds a consistent map.
    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait until no other caller holds `id`
    pub(crate) async fn lock(&self, id: &str) -> IdGuard<'_> {
        let entry = self.table().entry(id.to_string()).or_default().clone();
        let guard = entry.lock_owned().await;
        IdGuard {
            locks: self,
            id: id.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.table().len()
    }
}

pub(crate) struct IdGuard<'a> {
    locks: &'a IdLocks,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut table = self.locks.table();
        // one reference left means only the table itself knows this id
        if table.get(&self.id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            table.remove(&self.id);
        }
    }
}
