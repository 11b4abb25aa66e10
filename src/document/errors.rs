//! Document validation errors

use thiserror::Error;

/// Result type for document construction
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Reasons a value cannot become a `Document`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Identifier is the empty string
    #[error("document id must not be empty")]
    EmptyId,

    /// Object carries no `"id"` member
    #[error("document has no id")]
    MissingId,

    /// `"id"` member is not a string
    #[error("document id must be a string")]
    InvalidId,

    /// Field name collides with the identifier
    #[error("field name '{0}' is reserved")]
    ReservedField(String),

    /// Top-level value is not a JSON object
    #[error("document must be a JSON object")]
    NotAnObject,
}
