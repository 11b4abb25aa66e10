//! Step observers
//!
//! Logging, metrics and tracing hang off the pipeline through this trait
//! instead of being woven into the control flow. The service and the hook
//! chain report every step boundary; observers must not fail or block.

use std::sync::Arc;

use super::context::OperationContext;
use super::error::PipelineError;
use crate::storage::StorageError;

/// A step boundary inside `save` or `delete_by_id`
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    /// Save started; asking the store whether the id exists
    CheckingExistence,
    /// Existence known; entering the hook chain
    RunningHookChain { is_new: bool },
    /// About to call the hook at `position`
    HookInvoked { position: usize, name: &'a str },
    /// Chain exhausted; calling the terminal persist
    Persisting,
    /// Save finished
    Completed { is_new: bool },
    /// Save failed in any of the steps above
    Failed { error: &'a PipelineError },
    Deleting,
    Deleted,
    DeleteFailed { error: &'a StorageError },
}

impl PipelineEvent<'_> {
    /// Short stable name of the step
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckingExistence => "checking_existence",
            Self::RunningHookChain { .. } => "running_hook_chain",
            Self::HookInvoked { .. } => "hook_invoked",
            Self::Persisting => "persisting",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
            Self::Deleting => "deleting",
            Self::Deleted => "deleted",
            Self::DeleteFailed { .. } => "delete_failed",
        }
    }
}

/// Observer of pipeline steps
pub trait PipelineObserver: Send + Sync {
    fn observe(&self, ctx: &OperationContext, event: &PipelineEvent<'_>);
}

impl<T: PipelineObserver + ?Sized> PipelineObserver for Arc<T> {
    fn observe(&self, ctx: &OperationContext, event: &PipelineEvent<'_>) {
        (**self).observe(ctx, event)
    }
}

/// Observer that ignores everything
pub struct NoOpObserver;

impl PipelineObserver for NoOpObserver {
    fn observe(&self, _: &OperationContext, _: &PipelineEvent<'_>) {}
}

/// Fans every event out to several observers, in order
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl PipelineObserver for ObserverSet {
    fn observe(&self, ctx: &OperationContext, event: &PipelineEvent<'_>) {
        for observer in &self.observers {
            observer.observe(ctx, event);
        }
    }
}
