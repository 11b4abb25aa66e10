//! Operation context
//!
//! Carried through one `save` or `delete_by_id` call so that every step
//! boundary can be correlated in logs and metrics.

use std::time::Instant;

use uuid::Uuid;

/// Context of a single pipeline call
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Correlates all events of one call
    operation_id: Uuid,

    /// Id of the document the call was made for
    document_id: String,

    started_at: Instant,
}

impl OperationContext {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            document_id: document_id.into(),
            started_at: Instant::now(),
        }
    }

    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_context_gets_its_own_operation_id() {
        let a = OperationContext::new("doc");
        let b = OperationContext::new("doc");
        assert_ne!(a.operation_id(), b.operation_id());
        assert_eq!(a.document_id(), "doc");
    }
}
