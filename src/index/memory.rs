//! In-process search index for tests and local runs

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::errors::{IndexError, IndexResult};
use super::{IndexFuture, SearchIndex};
use crate::document::Fields;

#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    entries: RwLock<BTreeMap<String, Fields>>,
    created: AtomicBool,
    /// When set, every write fails with `IndexError::Unavailable`
    failing: AtomicBool,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, id: &str) -> Option<Fields> {
        self.entries.read().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, id: &str, fields: &Fields) -> IndexResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IndexError::unavailable("index marked as failing"));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| IndexError::unavailable("index lock poisoned"))?;
        entries.insert(id.to_string(), fields.clone());
        Ok(())
    }
}

impl SearchIndex for InMemorySearchIndex {
    fn index_document<'a>(&'a self, id: &'a str, fields: &'a Fields) -> IndexFuture<'a, ()> {
        Box::pin(async move { self.write(id, fields) })
    }

    fn ensure_index(&self) -> IndexFuture<'_, bool> {
        Box::pin(async move { Ok(!self.created.swap(true, Ordering::SeqCst)) })
    }
}
