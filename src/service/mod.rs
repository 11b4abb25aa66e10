//! Save Pipeline
//!
//! `DocumentService` is the surface the transport layer talks to:
//!
//! - `save`: existence check, then the hook chain, then a full-replace
//!   upsert. `is_new` is true when the id was absent at the check.
//! - `delete_by_id`: straight to the store; missing ids succeed.
//! - `list_all`: lazy stream from the store.
//!
//! The existence check and the upsert are not atomic. Two concurrent saves of
//! the same id may both report `is_new == true`; the store keeps whichever
//! write lands last. Setting `ServiceConfig::serialize_same_id` runs calls
//! for the same id one at a time instead.

mod locks;

use std::sync::Arc;

use serde::Deserialize;

use crate::core::{
    HookChain, NoOpObserver, OperationContext, PipelineEvent, PipelineObserver, PipelineResult,
    SaveFuture, SaveHook, SaveOutcome, Terminal,
};
use crate::document::Document;
use crate::observability::{Event, Logger};
use crate::storage::{DocumentStore, DocumentStream, StorageResult};

use locks::IdLocks;

/// Service behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Serialize saves and deletes that target the same id
    #[serde(default)]
    pub serialize_same_id: bool,
}

/// Terminal step: full-replace upsert, then wrap into the outcome
struct StorePersist {
    store: Arc<dyn DocumentStore>,
}

impl Terminal for StorePersist {
    fn persist(&self, document: Document, is_new: bool) -> SaveFuture<'_> {
        Box::pin(async move {
            let stored = self.store.upsert(document).await?;
            Ok(SaveOutcome::new(stored, is_new))
        })
    }
}

pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    chain: HookChain,
    observer: Arc<dyn PipelineObserver>,
    config: ServiceConfig,
    locks: IdLocks,
}

impl DocumentService {
    /// Build a service over `store` with hooks in registration order
    pub fn new(store: impl DocumentStore + 'static, hooks: Vec<Arc<dyn SaveHook>>) -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(store);
        let chain = HookChain::with_hooks(
            hooks,
            StorePersist {
                store: store.clone(),
            },
        );

        Self {
            store,
            chain,
            observer: Arc::new(NoOpObserver),
            config: ServiceConfig::default(),
            locks: IdLocks::new(),
        }
    }

    /// Report every step boundary of saves and deletes to `observer`
    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        let observer: Arc<dyn PipelineObserver> = Arc::new(observer);
        self.chain = self.chain.with_observer(observer.clone());
        self.observer = observer;
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    /// Registered hook names, in order
    pub fn hook_names(&self) -> Vec<&str> {
        self.chain.hook_names()
    }

    /// Create or fully replace `document`
    pub async fn save(&self, document: Document) -> PipelineResult<SaveOutcome> {
        let ctx = OperationContext::new(document.id());
        let _guard = if self.config.serialize_same_id {
            Some(self.locks.lock(document.id()).await)
        } else {
            None
        };

        let result = self.run_save(document, &ctx).await;
        match &result {
            Ok(outcome) => self.observer.observe(
                &ctx,
                &PipelineEvent::Completed {
                    is_new: outcome.is_new(),
                },
            ),
            Err(error) => self.observer.observe(&ctx, &PipelineEvent::Failed { error }),
        }
        result
    }

    async fn run_save(&self, document: Document, ctx: &OperationContext) -> PipelineResult<SaveOutcome> {
        self.observer.observe(ctx, &PipelineEvent::CheckingExistence);
        let existed = self.store.exists(document.id()).await?;
        let is_new = !existed;

        self.observer.observe(ctx, &PipelineEvent::RunningHookChain { is_new });
        self.chain.invoke(document, is_new, ctx).await
    }

    /// Remove a document; a missing id is not an error
    pub async fn delete_by_id(&self, id: &str) -> StorageResult<()> {
        let ctx = OperationContext::new(id);
        let _guard = if self.config.serialize_same_id {
            Some(self.locks.lock(id).await)
        } else {
            None
        };

        self.observer.observe(&ctx, &PipelineEvent::Deleting);
        let result = self.store.delete_by_id(id).await;
        match &result {
            Ok(()) => self.observer.observe(&ctx, &PipelineEvent::Deleted),
            Err(error) => self.observer.observe(&ctx, &PipelineEvent::DeleteFailed { error }),
        }
        result
    }

    /// Stream every stored document. Unbounded.
    pub fn list_all(&self) -> DocumentStream<'_> {
        Logger::info(Event::ListAllBegin.as_str(), &[]);
        self.store.find_all()
    }
}
