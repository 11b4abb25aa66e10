//! Per-call time bound for any document store

use std::time::Duration;

use futures_util::stream::{self, StreamExt};

use super::errors::{StorageError, StorageResult};
use super::{DocumentStore, DocumentStream, StoreFuture};
use crate::document::Document;

/// Wraps a store so that every call fails with `StorageError::Timeout`
/// once it runs longer than `limit`.
///
/// For `find_all` the bound applies to each item of the stream; the stream
/// ends after yielding the timeout error.
pub struct TimedStore<S> {
    inner: S,
    limit: Duration,
}

impl<S: DocumentStore> TimedStore<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(&self, operation: &'static str, fut: StoreFuture<'_, T>) -> StorageResult<T> {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout {
                operation,
                after: self.limit,
            }),
        }
    }
}

impl<S: DocumentStore> DocumentStore for TimedStore<S> {
    fn exists<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(self.bounded("exists", self.inner.exists(id)))
    }

    fn upsert(&self, document: Document) -> StoreFuture<'_, Document> {
        Box::pin(self.bounded("upsert", self.inner.upsert(document)))
    }

    fn delete_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(self.bounded("delete_by_id", self.inner.delete_by_id(id)))
    }

    fn find_all(&self) -> DocumentStream<'_> {
        let limit = self.limit;
        Box::pin(stream::unfold(
            Some(self.inner.find_all()),
            move |state| async move {
                let mut inner = state?;
                match tokio::time::timeout(limit, inner.next()).await {
                    Ok(Some(item)) => Some((item, Some(inner))),
                    Ok(None) => None,
                    Err(_) => Some((
                        Err(StorageError::Timeout {
                            operation: "find_all",
                            after: limit,
                        }),
                        None,
                    )),
                }
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDocumentStore;
    use std::future::pending;

    /// Store whose every call hangs forever
    struct StalledStore;

    impl DocumentStore for StalledStore {
        fn exists<'a>(&'a self, _id: &'a str) -> StoreFuture<'a, bool> {
            Box::pin(pending::<StorageResult<bool>>())
        }

        fn upsert(&self, _document: Document) -> StoreFuture<'_, Document> {
            Box::pin(pending::<StorageResult<Document>>())
        }

        fn delete_by_id<'a>(&'a self, _id: &'a str) -> StoreFuture<'a, ()> {
            Box::pin(pending::<StorageResult<()>>())
        }

        fn find_all(&self) -> DocumentStream<'_> {
            Box::pin(stream::pending::<StorageResult<Document>>())
        }
    }

    #[tokio::test]
    async fn test_stalled_call_times_out() {
        let store = TimedStore::new(StalledStore, Duration::from_millis(20));
        let err = store.exists("x").await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Timeout {
                operation: "exists",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_stalled_stream_yields_one_timeout_then_ends() {
        let store = TimedStore::new(StalledStore, Duration::from_millis(20));
        let items: Vec<_> = store.find_all().collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(StorageError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_fast_calls_pass_through() {
        let store = TimedStore::new(InMemoryDocumentStore::new(), Duration::from_secs(1));
        let doc = Document::empty("a").unwrap();
        store.upsert(doc).await.unwrap();
        assert!(store.exists("a").await.unwrap());
        assert_eq!(store.find_all().count().await, 1);
    }
}
