//! File store durability and integrity tests
//!
//! - Every acknowledged write survives reopen
//! - Updates replace, tombstones remove
//! - Corruption and truncation fail the open, never skipped
//! - A caller giving up on a write never tears the log

use std::fs;
use std::time::Duration;

use contented::document::Document;
use contented::service::DocumentService;
use contented::storage::{
    DocumentRecord, DocumentStore, FileDocumentStore, StorageError, TimedStore,
};
use futures_util::TryStreamExt;
use serde_json::{json, Value};
use tempfile::TempDir;

fn doc(value: Value) -> Document {
    Document::from_value(value).unwrap()
}

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

async fn all_documents(store: &FileDocumentStore) -> Vec<Value> {
    let documents: Vec<Document> = store.find_all().try_collect().await.unwrap();
    documents.iter().map(Document::to_value).collect()
}

#[tokio::test]
async fn test_service_writes_survive_reopen() {
    let temp_dir = create_temp_data_dir();

    {
        let store = FileDocumentStore::open(temp_dir.path()).await.unwrap();
        let service = DocumentService::new(store, Vec::new());
        assert!(service.save(doc(json!({"id": "X", "a": 1}))).await.unwrap().is_new());
        assert!(!service.save(doc(json!({"id": "X", "b": true}))).await.unwrap().is_new());
        service.save(doc(json!({"id": "Y", "n": [1, 2]}))).await.unwrap();
        service.delete_by_id("Y").await.unwrap();
        service.delete_by_id("never-existed").await.unwrap();
    }

    let store = FileDocumentStore::open(temp_dir.path()).await.unwrap();
    assert_eq!(all_documents(&store).await, vec![json!({"id": "X", "b": true})]);

    let service = DocumentService::new(store, Vec::new());
    let outcome = service.save(doc(json!({"id": "X"}))).await.unwrap();
    assert!(!outcome.is_new());
}

#[tokio::test]
async fn test_log_lives_under_data_subdirectory() {
    let temp_dir = create_temp_data_dir();
    let store = FileDocumentStore::open(temp_dir.path()).await.unwrap();
    assert_eq!(store.path(), temp_dir.path().join("data").join("documents.dat"));
}

#[tokio::test]
async fn test_corrupted_record_fails_open() {
    let temp_dir = create_temp_data_dir();
    let log_path = temp_dir.path().join("data/documents.dat");

    {
        let store = FileDocumentStore::open(temp_dir.path()).await.unwrap();
        store.upsert(doc(json!({"id": "doc1", "body": "some text"}))).await.unwrap();
    }

    let mut contents = fs::read(&log_path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&log_path, contents).unwrap();

    let err = FileDocumentStore::open(temp_dir.path()).await.err().unwrap();
    assert!(matches!(err, StorageError::Corrupted { offset: 0, .. }), "got: {}", err);
    assert!(err.to_string().to_lowercase().contains("checksum"), "got: {}", err);
}

#[tokio::test]
async fn test_truncated_tail_fails_open() {
    let temp_dir = create_temp_data_dir();
    let log_path = temp_dir.path().join("data/documents.dat");

    let first_len = {
        let store = FileDocumentStore::open(temp_dir.path()).await.unwrap();
        store.upsert(doc(json!({"id": "a"}))).await.unwrap();
        let first_len = fs::metadata(&log_path).unwrap().len();
        store.upsert(doc(json!({"id": "b"}))).await.unwrap();
        first_len
    };

    let contents = fs::read(&log_path).unwrap();
    fs::write(&log_path, &contents[..contents.len() - 3]).unwrap();

    let err = FileDocumentStore::open(temp_dir.path()).await.err().unwrap();
    match err {
        StorageError::Corrupted { offset, .. } => assert_eq!(offset, first_len),
        other => panic!("expected corruption, got {}", other),
    }
}

#[tokio::test]
async fn test_hand_written_log_is_replayed() {
    let temp_dir = create_temp_data_dir();
    let data = temp_dir.path().join("data");
    fs::create_dir_all(&data).unwrap();

    let mut bytes = Vec::new();
    bytes.extend(DocumentRecord::live("k", br#"{"id":"k","v":1}"#.to_vec()).serialize());
    bytes.extend(DocumentRecord::tombstone("k").serialize());
    bytes.extend(DocumentRecord::live("k", br#"{"id":"k","v":3}"#.to_vec()).serialize());
    fs::write(data.join("documents.dat"), bytes).unwrap();

    let store = FileDocumentStore::open(temp_dir.path()).await.unwrap();
    assert_eq!(all_documents(&store).await, vec![json!({"id": "k", "v": 3})]);
}

#[tokio::test]
async fn test_timed_out_write_leaves_log_openable() {
    let temp_dir = create_temp_data_dir();
    let big_body = "x".repeat(8 * 1024 * 1024);

    {
        let store = TimedStore::new(
            FileDocumentStore::open(temp_dir.path()).await.unwrap(),
            Duration::from_millis(1),
        );

        // the caller may give up; the append itself still runs to completion
        let _ = store.upsert(doc(json!({"id": "big", "body": big_body}))).await;

        // queued behind the big append on the log lock
        store.inner().upsert(doc(json!({"id": "small"}))).await.unwrap();
        store.inner().delete_by_id("small").await.unwrap();
        store.inner().upsert(doc(json!({"id": "after"}))).await.unwrap();
    }

    let store = FileDocumentStore::open(temp_dir.path()).await.unwrap();
    assert!(store.exists("big").await.unwrap());
    assert!(!store.exists("small").await.unwrap());
    assert!(store.exists("after").await.unwrap());

    let documents: Vec<Document> = store.find_all().try_collect().await.unwrap();
    let big = documents.iter().find(|d| d.id() == "big").unwrap();
    assert_eq!(big.get("body").and_then(|v| v.as_str()).map(str::len), Some(big_body.len()));
}
