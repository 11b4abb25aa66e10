//! # Hook Chain Runtime
//!
//! Generic ordered-invocation engine behind every save. A `HookChain` holds
//! an immutable list of `SaveHook`s and a `Terminal`; each hook gets a
//! `Next` continuation and decides whether and how to call the rest.
//!
//! ## Contract
//!
//! - Hooks run in registration order on the way in
//! - Post-processing after `next.run(..).await` runs in reverse order
//! - A hook calls its continuation at most once (`Next::run` takes `self`)
//! - Errors propagate immediately; outer hooks awaiting the continuation
//!   see them and decide whether to re-raise
//! - Every step boundary is reported to a `PipelineObserver`

pub mod chain;
pub mod context;
pub mod error;
pub mod observer;
pub mod outcome;

pub use chain::{HookChain, HookFuture, Next, SaveFuture, SaveHook, Terminal};
pub use context::OperationContext;
pub use error::{BoxError, HookChainError, HookError, PipelineError, PipelineResult};
pub use observer::{NoOpObserver, ObserverSet, PipelineEvent, PipelineObserver};
pub use outcome::SaveOutcome;
