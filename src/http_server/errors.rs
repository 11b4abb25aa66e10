//! HTTP error mapping
//!
//! Every failure leaves the server as `{"error": <message>, "code": <code>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::PipelineError;
use crate::observability::{log_event_with_fields, Event};
use crate::storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        StorageError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::Storage(e)) | ApiError::Storage(e) => storage_status(e),
            ApiError::Pipeline(PipelineError::HookChain(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Pipeline(e) => e.code(),
            ApiError::Storage(e) => e.code(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);
        log_event_with_fields(
            Event::RequestFailed,
            &[
                ("code", body.code.as_str()),
                ("status", status.as_str()),
            ],
        );
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HookChainError;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        let timeout = StorageError::Timeout {
            operation: "exists",
            after: Duration::from_millis(5),
        };
        assert_eq!(
            ApiError::from(PipelineError::from(timeout)).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::from(StorageError::unavailable("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(StorageError::corrupted(0, "bad crc")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let hook = PipelineError::from(HookChainError::Hook {
            hook: "audit".into(),
            source: "refused".into(),
        });
        assert_eq!(ApiError::from(hook).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_carries_code() {
        let err = ApiError::from(StorageError::unavailable("down"));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "STORAGE_UNAVAILABLE");
        assert!(body.error.contains("down"));
    }
}
