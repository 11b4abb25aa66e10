//! Document Store Gateway
//!
//! The store holds the source of truth for every document. The save
//! pipeline only needs four operations from it, all asynchronous and
//! fallible:
//!
//! - `exists(id)`
//! - `upsert(document)` with full-replace semantics (no field merge)
//! - `delete_by_id(id)`, idempotent
//! - `find_all()`, a lazy stream of every stored document
//!
//! Two backends ship with the crate: an in-memory map and an append-only,
//! checksummed log file. `TimedStore` bounds every call of either one.

mod checksum;
mod errors;
mod file;
mod memory;
mod record;
mod timeout;

pub use checksum::compute_checksum;
pub use errors::{StorageError, StorageResult};
pub use file::FileDocumentStore;
pub use memory::InMemoryDocumentStore;
pub use record::DocumentRecord;
pub use timeout::TimedStore;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::Stream;

use crate::document::Document;

/// Future returned by every store operation
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StorageResult<T>> + Send + 'a>>;

/// Lazy sequence of stored documents
pub type DocumentStream<'a> = Pin<Box<dyn Stream<Item = StorageResult<Document>> + Send + 'a>>;

/// Trait for the document store backend
pub trait DocumentStore: Send + Sync {
    /// Whether a document with this id is currently stored
    fn exists<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool>;

    /// Store the document, replacing any previous version entirely.
    ///
    /// Returns the document as stored.
    fn upsert(&self, document: Document) -> StoreFuture<'_, Document>;

    /// Remove a document. Removing a missing id succeeds.
    fn delete_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()>;

    /// Stream every stored document
    fn find_all(&self) -> DocumentStream<'_>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Arc<S> {
    fn exists<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        (**self).exists(id)
    }

    fn upsert(&self, document: Document) -> StoreFuture<'_, Document> {
        (**self).upsert(document)
    }

    fn delete_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()> {
        (**self).delete_by_id(id)
    }

    fn find_all(&self) -> DocumentStream<'_> {
        (**self).find_all()
    }
}
