//! Operational counters
//!
//! - Counters only, monotonic, reset only on process start
//! - Relaxed atomics; a snapshot is not a consistent cut across counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    documents_created: AtomicU64,
    documents_updated: AtomicU64,
    saves_failed: AtomicU64,
    /// Saves that failed with `PipelineError::HookChain`
    hook_failures: AtomicU64,
    deletes: AtomicU64,
    deletes_failed: AtomicU64,
    index_writes: AtomicU64,
    /// Swallowed by the secondary index hook
    index_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a successful save by whether it created the document
    pub fn record_save(&self, is_new: bool) {
        if is_new {
            Self::bump(&self.documents_created);
        } else {
            Self::bump(&self.documents_updated);
        }
    }

    pub fn record_save_failed(&self, hook_failure: bool) {
        Self::bump(&self.saves_failed);
        if hook_failure {
            Self::bump(&self.hook_failures);
        }
    }

    pub fn record_delete(&self) {
        Self::bump(&self.deletes);
    }

    pub fn record_delete_failed(&self) {
        Self::bump(&self.deletes_failed);
    }

    pub fn record_index_write(&self) {
        Self::bump(&self.index_writes);
    }

    pub fn record_index_failure(&self) {
        Self::bump(&self.index_failures);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_created: self.documents_created.load(Ordering::Relaxed),
            documents_updated: self.documents_updated.load(Ordering::Relaxed),
            saves_failed: self.saves_failed.load(Ordering::Relaxed),
            hook_failures: self.hook_failures.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            deletes_failed: self.deletes_failed.load(Ordering::Relaxed),
            index_writes: self.index_writes.load(Ordering::Relaxed),
            index_failures: self.index_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub documents_created: u64,
    pub documents_updated: u64,
    pub saves_failed: u64,
    pub hook_failures: u64,
    pub deletes: u64,
    pub deletes_failed: u64,
    pub index_writes: u64,
    pub index_failures: u64,
}
