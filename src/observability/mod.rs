//! Observability subsystem
//!
//! - Structured logging (one JSON line per event)
//! - Monotonic counters
//! - Pipeline observers that feed both
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. A logging or metrics failure never fails an operation
//! 3. No background threads
//!
//! # Usage
//!
//! ```ignore
//! use contented::observability::{Event, Logger, MetricsRegistry, ObservationScope};
//!
//! Logger::info(Event::SaveComplete.as_str(), &[("document_id", "X")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.record_save(true);
//!
//! let scope = ObservationScope::new("INDEX_SETUP");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod observers;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use observers::{LogObserver, MetricsObserver};
pub use scope::ObservationScope;

/// Log a lifecycle event at INFO
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields; failure events go out at ERROR
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
