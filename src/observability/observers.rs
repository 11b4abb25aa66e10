//! Pipeline observers backed by the logger and the metrics registry

use std::sync::Arc;

use super::events::Event;
use super::logger::Logger;
use super::metrics::MetricsRegistry;
use crate::core::{OperationContext, PipelineEvent, PipelineObserver};

/// Turns every pipeline step into one structured log line
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn observe(&self, ctx: &OperationContext, event: &PipelineEvent<'_>) {
        let operation_id = ctx.operation_id().to_string();
        let elapsed = ctx.elapsed_ms().to_string();
        let base = [
            ("document_id", ctx.document_id()),
            ("operation_id", operation_id.as_str()),
        ];

        match event {
            PipelineEvent::CheckingExistence => {
                Logger::info(Event::SaveBegin.as_str(), &base);
            }
            PipelineEvent::RunningHookChain { is_new } => {
                let mut fields = base.to_vec();
                fields.push(("is_new", bool_str(*is_new)));
                Logger::trace(Event::SaveExistenceChecked.as_str(), &fields);
            }
            PipelineEvent::HookInvoked { position, name } => {
                let position = position.to_string();
                let mut fields = base.to_vec();
                fields.push(("hook", *name));
                fields.push(("position", position.as_str()));
                Logger::trace(Event::HookInvoked.as_str(), &fields);
            }
            PipelineEvent::Persisting => {
                Logger::trace(Event::SavePersisting.as_str(), &base);
            }
            PipelineEvent::Completed { is_new } => {
                let mut fields = base.to_vec();
                fields.push(("is_new", bool_str(*is_new)));
                fields.push(("duration_ms", elapsed.as_str()));
                Logger::info(Event::SaveComplete.as_str(), &fields);
            }
            PipelineEvent::Failed { error } => {
                let reason = error.to_string();
                let mut fields = base.to_vec();
                fields.push(("code", error.code()));
                fields.push(("reason", reason.as_str()));
                fields.push(("duration_ms", elapsed.as_str()));
                Logger::error(Event::SaveFailed.as_str(), &fields);
            }
            PipelineEvent::Deleting => {
                Logger::info(Event::DeleteBegin.as_str(), &base);
            }
            PipelineEvent::Deleted => {
                let mut fields = base.to_vec();
                fields.push(("duration_ms", elapsed.as_str()));
                Logger::info(Event::DeleteComplete.as_str(), &fields);
            }
            PipelineEvent::DeleteFailed { error } => {
                let reason = error.to_string();
                let mut fields = base.to_vec();
                fields.push(("code", error.code()));
                fields.push(("reason", reason.as_str()));
                Logger::error(Event::DeleteFailed.as_str(), &fields);
            }
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Counts terminal outcomes of saves and deletes
#[derive(Debug, Clone)]
pub struct MetricsObserver {
    metrics: Arc<MetricsRegistry>,
}

impl MetricsObserver {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }
}

impl PipelineObserver for MetricsObserver {
    fn observe(&self, _ctx: &OperationContext, event: &PipelineEvent<'_>) {
        match event {
            PipelineEvent::Completed { is_new } => self.metrics.record_save(*is_new),
            PipelineEvent::Failed { error } => self.metrics.record_save_failed(error.is_hook_chain()),
            PipelineEvent::Deleted => self.metrics.record_delete(),
            PipelineEvent::DeleteFailed { .. } => self.metrics.record_delete_failed(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HookChainError, PipelineError};
    use crate::storage::StorageError;

    #[test]
    fn test_metrics_observer_counts_outcomes() {
        let metrics = Arc::new(MetricsRegistry::new());
        let observer = MetricsObserver::new(metrics.clone());
        let ctx = OperationContext::new("X");

        observer.observe(&ctx, &PipelineEvent::CheckingExistence);
        observer.observe(&ctx, &PipelineEvent::Completed { is_new: true });
        observer.observe(&ctx, &PipelineEvent::Completed { is_new: false });

        let hook_error = PipelineError::from(HookChainError::IdChanged {
            expected: "X".into(),
            actual: "Y".into(),
        });
        observer.observe(&ctx, &PipelineEvent::Failed { error: &hook_error });

        let store_error = StorageError::unavailable("down");
        observer.observe(&ctx, &PipelineEvent::DeleteFailed { error: &store_error });
        observer.observe(&ctx, &PipelineEvent::Deleted);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_created, 1);
        assert_eq!(snapshot.documents_updated, 1);
        assert_eq!(snapshot.saves_failed, 1);
        assert_eq!(snapshot.hook_failures, 1);
        assert_eq!(snapshot.deletes, 1);
        assert_eq!(snapshot.deletes_failed, 1);
    }

    #[test]
    fn test_log_observer_handles_every_step() {
        let ctx = OperationContext::new("X");
        let failure = PipelineError::from(StorageError::unavailable("down"));
        let delete_failure = StorageError::unavailable("down");
        let events = [
            PipelineEvent::CheckingExistence,
            PipelineEvent::RunningHookChain { is_new: true },
            PipelineEvent::HookInvoked { position: 0, name: "audit" },
            PipelineEvent::Persisting,
            PipelineEvent::Completed { is_new: true },
            PipelineEvent::Failed { error: &failure },
            PipelineEvent::Deleting,
            PipelineEvent::Deleted,
            PipelineEvent::DeleteFailed { error: &delete_failure },
        ];
        for event in &events {
            LogObserver.observe(&ctx, event);
        }
    }
}
