//! In-memory document store
//!
//! Used for local runs without a data directory and throughout the tests.
//! Documents are listed in id order.

use std::collections::BTreeMap;
use std::sync::RwLock;

use futures_util::stream::{self, StreamExt};

use super::errors::{StorageError, StorageResult};
use super::{DocumentStore, DocumentStream, StoreFuture};
use crate::document::Document;

/// In-memory storage backend
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<BTreeMap<String, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-existing documents, bypassing any pipeline
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let documents = documents
            .into_iter()
            .map(|doc| (doc.id().to_string(), doc))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Current stored version of a document
    pub fn get(&self, id: &str) -> StorageResult<Option<Document>> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.get(id).cloned())
    }

    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.documents.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StorageError {
    StorageError::unavailable(e.to_string())
}

impl DocumentStore for InMemoryDocumentStore {
    fn exists<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let documents = self.documents.read().map_err(poisoned)?;
            Ok(documents.contains_key(id))
        })
    }

    fn upsert(&self, document: Document) -> StoreFuture<'_, Document> {
        Box::pin(async move {
            let mut documents = self.documents.write().map_err(poisoned)?;
            documents.insert(document.id().to_string(), document.clone());
            Ok(document)
        })
    }

    fn delete_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut documents = self.documents.write().map_err(poisoned)?;
            documents.remove(id);
            Ok(())
        })
    }

    fn find_all(&self) -> DocumentStream<'_> {
        let snapshot = async move {
            match self.documents.read() {
                Ok(documents) => documents.values().cloned().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(poisoned(e))],
            }
        };
        Box::pin(stream::once(snapshot).flat_map(stream::iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() {
        let store = InMemoryDocumentStore::new();
        store.upsert(doc(json!({"id": "X", "a": 1}))).await.unwrap();
        store.upsert(doc(json!({"id": "X", "b": true}))).await.unwrap();

        let stored = store.get("X").unwrap().unwrap();
        assert_eq!(stored.to_value(), json!({"id": "X", "b": true}));
    }

    #[tokio::test]
    async fn test_exists_tracks_upsert_and_delete() {
        let store = InMemoryDocumentStore::new();
        assert!(!store.exists("k").await.unwrap());

        store.upsert(doc(json!({"id": "k"}))).await.unwrap();
        assert!(store.exists("k").await.unwrap());

        store.delete_by_id("k").await.unwrap();
        assert!(!store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let store = InMemoryDocumentStore::new();
        assert!(store.delete_by_id("never-stored").await.is_ok());
    }

    #[tokio::test]
    async fn test_find_all_in_id_order() {
        let store = InMemoryDocumentStore::with_documents([
            doc(json!({"id": "b"})),
            doc(json!({"id": "a"})),
            doc(json!({"id": "c"})),
        ]);

        let all: Vec<Document> = store.find_all().try_collect().await.unwrap();
        let ids: Vec<&str> = all.iter().map(|d| d.id()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
