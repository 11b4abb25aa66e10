//! Search Index Client
//!
//! A derived, eventually consistent view of the document store. Saves
//! mirror into it through `SecondaryIndexHook`; failures there never reach
//! the caller of `save`.

mod config;
mod elasticsearch;
mod errors;
mod hook;
mod memory;

pub use config::SearchIndexConfig;
pub use elasticsearch::ElasticsearchIndex;
pub use errors::{IndexError, IndexResult};
pub use hook::SecondaryIndexHook;
pub use memory::InMemorySearchIndex;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::document::Fields;

pub type IndexFuture<'a, T> = Pin<Box<dyn Future<Output = IndexResult<T>> + Send + 'a>>;

pub trait SearchIndex: Send + Sync {
    /// Write `fields` under `id`, replacing any earlier entry
    fn index_document<'a>(&'a self, id: &'a str, fields: &'a Fields) -> IndexFuture<'a, ()>;

    /// Create the index if missing. `Ok(true)` when this call created it.
    fn ensure_index(&self) -> IndexFuture<'_, bool>;
}

impl<T: SearchIndex + ?Sized> SearchIndex for Arc<T> {
    fn index_document<'a>(&'a self, id: &'a str, fields: &'a Fields) -> IndexFuture<'a, ()> {
        (**self).index_document(id, fields)
    }

    fn ensure_index(&self) -> IndexFuture<'_, bool> {
        (**self).ensure_index()
    }
}
