//! Hook Chain Runtime
//!
//! Runs an ordered list of save hooks around a terminal persist step, in
//! nested-middleware fashion: hooks run in registration order on the way in,
//! and whatever a hook does after awaiting its continuation runs in reverse
//! order on the way out.
//!
//! Each hook receives a `Next`. Calling `Next::run` hands the (possibly
//! changed) document to the rest of the chain. `run` consumes the
//! continuation, so a hook can call it at most once. Not calling it at all
//! short-circuits the chain, and the hook must produce the `SaveOutcome`
//! itself.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::context::OperationContext;
use super::error::{HookChainError, HookError, PipelineResult};
use super::observer::{NoOpObserver, PipelineEvent, PipelineObserver};
use super::outcome::SaveOutcome;
use crate::document::Document;

/// Future produced by the chain and the terminal
pub type SaveFuture<'a> = Pin<Box<dyn Future<Output = PipelineResult<SaveOutcome>> + Send + 'a>>;

/// Future produced by a hook
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<SaveOutcome, HookError>> + Send + 'a>>;

/// A pluggable step of the save pipeline
pub trait SaveHook: Send + Sync {
    /// Name used in logs and in `HookChainError::Hook`
    fn name(&self) -> &str;

    /// Observe, transform or short-circuit a save
    fn invoke<'a>(&'a self, document: Document, is_new: bool, next: Next<'a>) -> HookFuture<'a>;
}

/// Final stage of the chain
pub trait Terminal: Send + Sync {
    fn persist(&self, document: Document, is_new: bool) -> SaveFuture<'_>;
}

/// Continuation handed to a hook: the remainder of the chain
pub struct Next<'a> {
    hooks: &'a [Arc<dyn SaveHook>],
    position: usize,
    terminal: &'a dyn Terminal,
    observer: &'a dyn PipelineObserver,
    ctx: &'a OperationContext,
}

impl<'a> Next<'a> {
    /// Run the next hook, or the terminal when no hooks remain
    pub fn run(self, document: Document, is_new: bool) -> SaveFuture<'a> {
        Box::pin(async move {
            let hooks = self.hooks;
            match hooks.get(self.position) {
                Some(hook) => {
                    self.observer.observe(
                        self.ctx,
                        &PipelineEvent::HookInvoked {
                            position: self.position,
                            name: hook.name(),
                        },
                    );
                    let next = Next {
                        position: self.position + 1,
                        ..self
                    };
                    hook.invoke(document, is_new, next)
                        .await
                        .map_err(|e| e.into_pipeline_error(hook.name()))
                }
                None => {
                    if document.id() != self.ctx.document_id() {
                        return Err(HookChainError::IdChanged {
                            expected: self.ctx.document_id().to_string(),
                            actual: document.id().to_string(),
                        }
                        .into());
                    }
                    self.observer.observe(self.ctx, &PipelineEvent::Persisting);
                    self.terminal.persist(document, is_new).await
                }
            }
        })
    }

    /// Position of the hook this continuation will call
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of hooks still ahead of the terminal
    pub fn remaining(&self) -> usize {
        self.hooks.len().saturating_sub(self.position)
    }

    /// Context of the call this continuation belongs to
    pub fn context(&self) -> &'a OperationContext {
        self.ctx
    }
}

/// An ordered, immutable list of hooks in front of a terminal
pub struct HookChain {
    hooks: Vec<Arc<dyn SaveHook>>,
    terminal: Arc<dyn Terminal>,
    observer: Arc<dyn PipelineObserver>,
}

impl HookChain {
    /// Create a chain with no hooks
    pub fn new(terminal: impl Terminal + 'static) -> Self {
        Self::with_hooks(Vec::new(), terminal)
    }

    /// Create a chain from hooks in registration order
    pub fn with_hooks(hooks: Vec<Arc<dyn SaveHook>>, terminal: impl Terminal + 'static) -> Self {
        Self {
            hooks,
            terminal: Arc::new(terminal),
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Append a hook
    pub fn with_hook(mut self, hook: impl SaveHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run the chain from `position`; positions past the last hook go
    /// straight to the terminal.
    pub fn invoke_from<'a>(
        &'a self,
        position: usize,
        document: Document,
        is_new: bool,
        ctx: &'a OperationContext,
    ) -> SaveFuture<'a> {
        let next = Next {
            hooks: &self.hooks,
            position,
            terminal: self.terminal.as_ref(),
            observer: self.observer.as_ref(),
            ctx,
        };
        next.run(document, is_new)
    }

    /// Run the whole chain
    pub fn invoke<'a>(
        &'a self,
        document: Document,
        is_new: bool,
        ctx: &'a OperationContext,
    ) -> SaveFuture<'a> {
        self.invoke_from(0, document, is_new, ctx)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names in registration order
    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }
}
