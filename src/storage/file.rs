//! Append-only document log
//!
//! Layout: `<data_dir>/data/documents.dat`, a sequence of checksummed
//! `DocumentRecord`s. There are no in-place updates:
//!
//! - an upsert appends the full encoded document
//! - a delete appends a tombstone
//! - on open the log is replayed and the latest record per id wins
//!
//! Every append is fsynced before the operation is acknowledged. Any
//! checksum or framing failure during replay fails the open; corrupt
//! records are never skipped.
//!
//! Each append runs on its own task, so a caller that stops waiting (a
//! timeout, a dropped request) never leaves half a record behind. An append
//! that fails partway is truncated back to the last acknowledged record; if
//! that truncation fails too, the store refuses further writes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use super::errors::{StorageError, StorageResult};
use super::record::DocumentRecord;
use super::{DocumentStore, DocumentStream, StoreFuture};
use crate::document::Document;
use crate::observability::{Event, Logger};

/// File-backed document store
pub struct FileDocumentStore {
    path: PathBuf,
    shared: Arc<Shared>,
}

struct Shared {
    /// Appends are serialized here; the map is updated while this is held
    /// so that log order and visible state agree.
    log: Mutex<LogFile>,
    documents: RwLock<BTreeMap<String, Document>>,
}

struct LogFile {
    file: File,
    /// End of the last acknowledged record
    len: u64,
    /// Why writes are refused, once a failed append could not be undone
    poisoned: Option<String>,
}

enum Change {
    Put(Document),
    Remove(String),
}

impl FileDocumentStore {
    /// Opens (or creates) the log under `data_dir` and replays it.
    pub async fn open(data_dir: &Path) -> StorageResult<Self> {
        let data_subdir = data_dir.join("data");
        let path = data_subdir.join("documents.dat");

        fs::create_dir_all(&data_subdir).await.map_err(|e| {
            StorageError::io(
                format!("Failed to create data directory: {}", data_subdir.display()),
                e,
            )
        })?;

        let (documents, len) = match fs::read(&path).await {
            Ok(bytes) => (replay(&bytes)?, bytes.len() as u64),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (BTreeMap::new(), 0),
            Err(e) => {
                return Err(StorageError::io(
                    format!("Failed to read document log: {}", path.display()),
                    e,
                ))
            }
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                StorageError::io(format!("Failed to open document log: {}", path.display()), e)
            })?;

        let count = documents.len().to_string();
        let shown = path.display().to_string();
        Logger::info(
            Event::StoreOpened.as_str(),
            &[("documents", count.as_str()), ("path", shown.as_str())],
        );

        Ok(Self {
            path,
            shared: Arc::new(Shared {
                log: Mutex::new(LogFile::new(file, len)),
                documents: RwLock::new(documents),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `record` and apply `change` on a task of its own
    async fn commit(&self, record: DocumentRecord, change: Change) -> StorageResult<()> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.commit(record, change).await })
            .await
            .map_err(|e| StorageError::unavailable(format!("document log writer stopped: {}", e)))?
    }
}

impl Shared {
    async fn commit(&self, record: DocumentRecord, change: Change) -> StorageResult<()> {
        let mut log = self.log.lock().await;
        if let Change::Remove(id) = &change {
            if !self.documents.read().await.contains_key(id) {
                return Ok(());
            }
        }

        log.append(&record.serialize()).await?;

        let mut documents = self.documents.write().await;
        match change {
            Change::Put(document) => {
                documents.insert(document.id().to_string(), document);
            }
            Change::Remove(id) => {
                documents.remove(&id);
            }
        }
        Ok(())
    }
}

impl LogFile {
    fn new(file: File, len: u64) -> Self {
        Self {
            file,
            len,
            poisoned: None,
        }
    }

    async fn append(&mut self, bytes: &[u8]) -> StorageResult<()> {
        if let Some(reason) = &self.poisoned {
            return Err(StorageError::unavailable(format!(
                "document log refuses writes after a failed rollback: {}",
                reason
            )));
        }

        match self.write_synced(bytes).await {
            Ok(()) => {
                self.len += bytes.len() as u64;
                Ok(())
            }
            Err(e) => {
                self.rollback().await;
                Err(e)
            }
        }
    }

    async fn write_synced(&mut self, bytes: &[u8]) -> StorageResult<()> {
        self.file
            .write_all(bytes)
            .await
            .map_err(|e| StorageError::io("Failed to append record", e))?;
        // surfaces errors from writes still in flight
        self.file
            .flush()
            .await
            .map_err(|e| StorageError::io("Failed to append record", e))?;
        self.file
            .sync_data()
            .await
            .map_err(|e| StorageError::io("Failed to fsync document log", e))
    }

    /// Cut the log back to the last acknowledged record
    async fn rollback(&mut self) {
        let len = self.len.to_string();
        // settle any write still in flight before truncating
        let _ = self.file.flush().await;
        let restored = match self.file.set_len(self.len).await {
            Ok(()) => self.file.sync_data().await,
            Err(e) => Err(e),
        };

        match restored {
            Ok(()) => Logger::warn(Event::StoreAppendRolledBack.as_str(), &[("len", len.as_str())]),
            Err(e) => {
                let reason = e.to_string();
                Logger::error(
                    Event::StorePoisoned.as_str(),
                    &[("len", len.as_str()), ("reason", reason.as_str())],
                );
                self.poisoned = Some(reason);
            }
        }
    }
}

/// Rebuild the live document set from raw log bytes
fn replay(bytes: &[u8]) -> StorageResult<BTreeMap<String, Document>> {
    let mut documents = BTreeMap::new();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let (record, consumed) = DocumentRecord::deserialize(&bytes[offset..])
            .map_err(|e| StorageError::corrupted(offset as u64, e.to_string()))?;

        if record.is_tombstone {
            documents.remove(&record.document_id);
        } else {
            let document: Document = serde_json::from_slice(&record.body)
                .map_err(|e| StorageError::corrupted(offset as u64, e.to_string()))?;
            if document.id() != record.document_id {
                return Err(StorageError::corrupted(
                    offset as u64,
                    format!(
                        "record key '{}' does not match body id '{}'",
                        record.document_id,
                        document.id()
                    ),
                ));
            }
            documents.insert(record.document_id, document);
        }

        offset += consumed;
    }

    Ok(documents)
}

impl DocumentStore for FileDocumentStore {
    fn exists<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.shared.documents.read().await.contains_key(id)) })
    }

    fn upsert(&self, document: Document) -> StoreFuture<'_, Document> {
        Box::pin(async move {
            let body = serde_json::to_vec(&document)?;
            let record = DocumentRecord::live(document.id(), body);

            self.commit(record, Change::Put(document.clone())).await?;
            Ok(document)
        })
    }

    fn delete_by_id<'a>(&'a self, id: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.commit(DocumentRecord::tombstone(id), Change::Remove(id.to_string()))
                .await
        })
    }

    fn find_all(&self) -> DocumentStream<'_> {
        let snapshot = async move {
            let documents = self.shared.documents.read().await;
            documents.values().cloned().map(Ok).collect::<Vec<_>>()
        };
        Box::pin(stream::once(snapshot).flat_map(stream::iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn test_replay_latest_wins_and_tombstones_remove() {
        let mut bytes = Vec::new();
        bytes.extend(DocumentRecord::live("a", br#"{"id":"a","v":1}"#.to_vec()).serialize());
        bytes.extend(DocumentRecord::live("b", br#"{"id":"b"}"#.to_vec()).serialize());
        bytes.extend(DocumentRecord::live("a", br#"{"id":"a","v":2}"#.to_vec()).serialize());
        bytes.extend(DocumentRecord::tombstone("b").serialize());

        let documents = replay(&bytes).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents["a"].get("v"), Some(&json!(2)));
    }

    #[test]
    fn test_replay_rejects_mismatched_key() {
        let bytes = DocumentRecord::live("a", br#"{"id":"b"}"#.to_vec()).serialize();
        let err = replay(&bytes).unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_delete_missing_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::open(dir.path()).await.unwrap();

        store.delete_by_id("nope").await.unwrap();

        let len = std::fs::metadata(store.path()).unwrap().len();
        assert_eq!(len, 0);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileDocumentStore::open(dir.path()).await.unwrap();
            store.upsert(doc(json!({"id": "X", "a": 1}))).await.unwrap();
            store.upsert(doc(json!({"id": "X", "b": true}))).await.unwrap();
            store.upsert(doc(json!({"id": "Y"}))).await.unwrap();
            store.delete_by_id("Y").await.unwrap();
        }

        let store = FileDocumentStore::open(dir.path()).await.unwrap();
        assert!(store.exists("X").await.unwrap());
        assert!(!store.exists("Y").await.unwrap());

        let all: Vec<Document> = futures_util::TryStreamExt::try_collect(store.find_all())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].to_value(), json!({"id": "X", "b": true}));
    }

    async fn log_file(dir: &TempDir, contents: &[u8], acknowledged: u64) -> (PathBuf, LogFile) {
        let path = dir.path().join("documents.dat");
        std::fs::write(&path, contents).unwrap();
        let file = OpenOptions::new().append(true).open(&path).await.unwrap();
        (path, LogFile::new(file, acknowledged))
    }

    #[tokio::test]
    async fn test_rollback_cuts_unacknowledged_tail() {
        let dir = TempDir::new().unwrap();
        let first = DocumentRecord::live("a", br#"{"id":"a"}"#.to_vec()).serialize();
        let mut contents = first.clone();
        contents.extend_from_slice(&[0xAB; 7]);
        let (path, mut log) = log_file(&dir, &contents, first.len() as u64).await;

        log.rollback().await;

        assert!(log.poisoned.is_none());
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, first);
        assert_eq!(replay(&bytes).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_poisoned_log_refuses_writes() {
        let dir = TempDir::new().unwrap();
        let (path, mut log) = log_file(&dir, b"", 0).await;
        log.poisoned = Some("disk gone".into());

        let err = log
            .append(&DocumentRecord::tombstone("a").serialize())
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(err.to_string().contains("disk gone"));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_append_advances_acknowledged_length() {
        let dir = TempDir::new().unwrap();
        let (path, mut log) = log_file(&dir, b"", 0).await;
        let record = DocumentRecord::tombstone("a").serialize();

        log.append(&record).await.unwrap();

        assert_eq!(log.len, record.len() as u64);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), log.len);
    }
}
