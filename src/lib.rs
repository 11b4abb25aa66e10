//! contented - a schemaless document service with a pluggable save pipeline
//!
//! Documents are open JSON objects keyed by `id`. Every save runs an
//! existence check, then an ordered chain of async hooks, then a
//! full-replace upsert. A search index can be kept in sync as a
//! best-effort side effect of saves.

pub mod cli;
pub mod core;
pub mod document;
pub mod http_server;
pub mod index;
pub mod observability;
pub mod service;
pub mod storage;
