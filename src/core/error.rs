//! Save pipeline error types
//!
//! Two kinds of failure reach the caller of `save`:
//!
//! - `Storage`: the document store failed (from the existence check or the
//!   terminal persist)
//! - `HookChain`: a hook raised an error or broke the chain contract
//!
//! Neither is retried or recovered here.

use thiserror::Error;

use crate::storage::StorageError;

/// Boxed error raised by hook code
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Save pipeline result type
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure of a save or delete
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    HookChain(#[from] HookChainError),
}

/// Failure attributed to the hook chain
#[derive(Debug, Error)]
pub enum HookChainError {
    /// A hook raised its own error
    #[error("save hook '{hook}' failed: {source}")]
    Hook {
        hook: String,
        #[source]
        source: BoxError,
    },

    /// A hook handed the continuation a document with a different id
    #[error("document id changed inside the hook chain: '{expected}' became '{actual}'")]
    IdChanged { expected: String, actual: String },
}

impl PipelineError {
    /// Stable code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.code(),
            Self::HookChain(HookChainError::Hook { .. }) => "HOOK_FAILED",
            Self::HookChain(HookChainError::IdChanged { .. }) => "HOOK_CONTRACT_VIOLATION",
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    pub fn is_hook_chain(&self) -> bool {
        matches!(self, Self::HookChain(_))
    }
}

/// Error returned from a hook's `invoke`.
///
/// `?` on the continuation's result produces `Propagated`, which reaches the
/// caller untouched. `Raised` is the hook's own failure; the chain wraps it
/// into `HookChainError::Hook` carrying the hook's name.
#[derive(Debug)]
pub enum HookError {
    Propagated(PipelineError),
    Raised(BoxError),
}

impl HookError {
    /// Raise an error originating in the hook itself
    pub fn raise(error: impl Into<BoxError>) -> Self {
        Self::Raised(error.into())
    }

    /// Raise a plain message
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Raised(message.into())
    }

    pub(crate) fn into_pipeline_error(self, hook: &str) -> PipelineError {
        match self {
            Self::Propagated(e) => e,
            Self::Raised(source) => PipelineError::HookChain(HookChainError::Hook {
                hook: hook.to_string(),
                source,
            }),
        }
    }
}

impl From<PipelineError> for HookError {
    fn from(e: PipelineError) -> Self {
        Self::Propagated(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raised_error_is_attributed_to_hook() {
        let err = HookError::msg("index offline").into_pipeline_error("audit");
        assert!(err.is_hook_chain());
        assert_eq!(err.code(), "HOOK_FAILED");
        let text = err.to_string();
        assert!(text.contains("audit"));
        assert!(text.contains("index offline"));
    }

    #[test]
    fn test_propagated_error_passes_through() {
        let inner = PipelineError::from(StorageError::unavailable("down"));
        let err = HookError::from(inner).into_pipeline_error("audit");
        assert!(err.is_storage());
        assert_eq!(err.code(), "STORAGE_UNAVAILABLE");
    }

    #[test]
    fn test_hook_source_is_preserved() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = HookError::raise(io).into_pipeline_error("h");
        let source = err.source().map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("disk"));
    }
}
