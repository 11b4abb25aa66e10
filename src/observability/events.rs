//! Observable events
//!
//! Every log line names one of these. Events are explicit and typed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & lifecycle
    BootStart,
    BootComplete,
    ConfigLoaded,
    StoreOpened,
    StoreAppendRolledBack,
    StorePoisoned,
    Serving,
    ShutdownComplete,

    // Save pipeline
    SaveBegin,
    SaveExistenceChecked,
    HookInvoked,
    SavePersisting,
    SaveComplete,
    SaveFailed,

    // Delete / list
    DeleteBegin,
    DeleteComplete,
    DeleteFailed,
    ListAllBegin,

    // Search index
    IndexWrite,
    IndexWriteFailed,
    IndexExists,
    IndexCreated,
    IndexSetupFailed,

    // Transport
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "CONTENTED_STARTUP_BEGIN",
            Event::BootComplete => "CONTENTED_STARTUP_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreAppendRolledBack => "STORE_APPEND_ROLLED_BACK",
            Event::StorePoisoned => "STORE_POISONED",
            Event::Serving => "CONTENTED_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::SaveBegin => "SAVE_BEGIN",
            Event::SaveExistenceChecked => "SAVE_EXISTENCE_CHECKED",
            Event::HookInvoked => "SAVE_HOOK_INVOKED",
            Event::SavePersisting => "SAVE_PERSISTING",
            Event::SaveComplete => "SAVE_COMPLETE",
            Event::SaveFailed => "SAVE_FAILED",

            Event::DeleteBegin => "DELETE_BEGIN",
            Event::DeleteComplete => "DELETE_COMPLETE",
            Event::DeleteFailed => "DELETE_FAILED",
            Event::ListAllBegin => "LIST_ALL_BEGIN",

            Event::IndexWrite => "INDEX_WRITE",
            Event::IndexWriteFailed => "INDEX_WRITE_FAILED",
            Event::IndexExists => "INDEX_EXISTS",
            Event::IndexCreated => "INDEX_CREATED",
            Event::IndexSetupFailed => "INDEX_SETUP_FAILED",

            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Events that mean an operation was reported as failed to its caller
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::SaveFailed | Event::DeleteFailed | Event::IndexSetupFailed | Event::RequestFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake_case() {
        let events = [
            Event::BootStart,
            Event::StoreOpened,
            Event::SaveBegin,
            Event::HookInvoked,
            Event::SaveComplete,
            Event::DeleteComplete,
            Event::IndexWriteFailed,
            Event::RequestFailed,
        ];
        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_swallowed_index_failure_is_not_a_failure_event() {
        assert!(Event::SaveFailed.is_failure());
        assert!(!Event::IndexWriteFailed.is_failure());
    }
}
