//! Search index errors
//!
//! These stay inside the index subsystem during saves: the secondary index
//! hook logs and drops them. Only explicit provisioning (`ensure_index`)
//! hands them to a caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    /// Transport failure: connect, timeout, body decode
    #[error("search index request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("search index returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("search index unavailable: {0}")]
    Unavailable(String),

    #[error("invalid search index configuration: {0}")]
    InvalidConfig(String),
}

impl IndexError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Request(e) if e.is_timeout() => "INDEX_TIMEOUT",
            Self::Request(_) => "INDEX_REQUEST_FAILED",
            Self::Status { .. } => "INDEX_REJECTED",
            Self::Unavailable(_) => "INDEX_UNAVAILABLE",
            Self::InvalidConfig(_) => "INDEX_INVALID_CONFIG",
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = IndexError::Status {
            status: 400,
            body: "bad mapping".into(),
        };
        assert_eq!(err.to_string(), "search index returned HTTP 400: bad mapping");
        assert_eq!(err.code(), "INDEX_REJECTED");
    }

    #[test]
    fn test_codes() {
        assert_eq!(IndexError::unavailable("down").code(), "INDEX_UNAVAILABLE");
        assert_eq!(IndexError::InvalidConfig("x".into()).code(), "INDEX_INVALID_CONFIG");
    }
}
