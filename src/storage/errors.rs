//! Storage error types
//!
//! Every storage failure reaches the caller of `save`/`delete_by_id`
//! unchanged. Nothing in this crate retries a store call.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Document store failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend cannot serve requests (lock poisoned, connection lost)
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A single call exceeded its time bound
    #[error("document store {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Disk I/O failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Log contents fail checksum or framing validation
    #[error("data corruption at offset {offset}: {message}")]
    Corrupted { offset: u64, message: String },

    /// Document could not be encoded or decoded
    #[error("document encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }

    /// Corruption means the on-disk state cannot be trusted any more
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Corrupted { .. })
    }

    /// Stable code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "STORAGE_UNAVAILABLE",
            Self::Timeout { .. } => "STORAGE_TIMEOUT",
            Self::Io { .. } => "STORAGE_IO_ERROR",
            Self::Corrupted { .. } => "DATA_CORRUPTION",
            Self::Serialization(_) => "STORAGE_ENCODING_ERROR",
        }
    }
}
