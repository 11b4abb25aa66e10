//! Best-effort mirroring of saved documents into the search index

use std::sync::Arc;

use super::SearchIndex;
use crate::core::{HookFuture, Next, SaveHook};
use crate::document::Document;
use crate::observability::{Event, Logger, MetricsRegistry};

/// Save hook that indexes the persisted document after the rest of the
/// chain has run.
///
/// Index failures are logged at WARN as `INDEX_WRITE_FAILED` and dropped;
/// the save still succeeds. Errors from further down the chain pass
/// through untouched and nothing is indexed.
pub struct SecondaryIndexHook {
    index: Arc<dyn SearchIndex>,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl SecondaryIndexHook {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self {
            index,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl SaveHook for SecondaryIndexHook {
    fn name(&self) -> &str {
        "secondary_index"
    }

    fn invoke<'a>(&'a self, document: Document, is_new: bool, next: Next<'a>) -> HookFuture<'a> {
        Box::pin(async move {
            let outcome = next.run(document, is_new).await?;

            let saved = outcome.document();
            match self.index.index_document(saved.id(), saved.fields()).await {
                Ok(()) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_index_write();
                    }
                    Logger::trace(Event::IndexWrite.as_str(), &[("document_id", saved.id())]);
                }
                Err(e) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_index_failure();
                    }
                    let reason = e.to_string();
                    Logger::warn(
                        Event::IndexWriteFailed.as_str(),
                        &[
                            ("code", e.code()),
                            ("document_id", saved.id()),
                            ("reason", reason.as_str()),
                        ],
                    );
                }
            }

            Ok(outcome)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HookChain, OperationContext, PipelineError, SaveFuture, SaveOutcome, Terminal};
    use crate::index::InMemorySearchIndex;
    use crate::storage::StorageError;
    use serde_json::json;

    /// Terminal that stamps a generated field, like a store filling defaults
    struct StampingTerminal;

    impl Terminal for StampingTerminal {
        fn persist(&self, mut document: Document, is_new: bool) -> SaveFuture<'_> {
            Box::pin(async move {
                document
                    .insert("version", json!(1))
                    .map_err(|e| PipelineError::Storage(StorageError::unavailable(e.to_string())))?;
                Ok(SaveOutcome::new(document, is_new))
            })
        }
    }

    struct DownTerminal;

    impl Terminal for DownTerminal {
        fn persist(&self, _: Document, _: bool) -> SaveFuture<'_> {
            Box::pin(async { Err(StorageError::unavailable("down").into()) })
        }
    }

    fn doc() -> Document {
        Document::from_value(json!({"id": "X", "title": "t"})).unwrap()
    }

    #[tokio::test]
    async fn test_indexes_persisted_document() {
        let index = Arc::new(InMemorySearchIndex::new());
        let metrics = Arc::new(MetricsRegistry::new());
        let chain = HookChain::new(StampingTerminal)
            .with_hook(SecondaryIndexHook::new(index.clone()).with_metrics(metrics.clone()));

        let ctx = OperationContext::new("X");
        chain.invoke(doc(), true, &ctx).await.unwrap();

        let indexed = index.get("X").unwrap();
        assert_eq!(indexed.get("version"), Some(&json!(1)));
        assert_eq!(metrics.snapshot().index_writes, 1);
    }

    #[tokio::test]
    async fn test_index_failure_is_swallowed() {
        let index = Arc::new(InMemorySearchIndex::new());
        index.set_failing(true);
        let metrics = Arc::new(MetricsRegistry::new());
        let chain = HookChain::new(StampingTerminal)
            .with_hook(SecondaryIndexHook::new(index.clone()).with_metrics(metrics.clone()));

        let ctx = OperationContext::new("X");
        let outcome = chain.invoke(doc(), true, &ctx).await.unwrap();

        assert!(outcome.is_new());
        assert_eq!(metrics.snapshot().index_failures, 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_without_indexing() {
        let index = Arc::new(InMemorySearchIndex::new());
        let chain = HookChain::new(DownTerminal).with_hook(SecondaryIndexHook::new(index.clone()));

        let ctx = OperationContext::new("X");
        let err = chain.invoke(doc(), true, &ctx).await.unwrap_err();

        assert!(err.is_storage());
        assert!(index.is_empty());
    }
}
