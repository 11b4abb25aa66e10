//! Scoped start/complete logging for multi-step procedures
//!
//! Used around boot and search index provisioning. A scope logs
//! `{name}_BEGIN` when opened and exactly one closing line:
//! `{name}_COMPLETE`, `{name}_FAILED`, or `{name}_INCOMPLETE` if it was
//! dropped without being closed.

use std::time::Instant;

use super::logger::Logger;

pub struct ObservationScope {
    name: &'static str,
    closed: bool,
    fields: Vec<(&'static str, String)>,
    started_at: Instant,
}

impl ObservationScope {
    /// Open a scope; logs `{name}_BEGIN`
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Open a scope whose fields are repeated on every line it logs
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        Logger::info(&format!("{}_BEGIN", name), fields);

        Self {
            name,
            closed: false,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            started_at: Instant::now(),
        }
    }

    fn closing_fields<'s>(&'s self, elapsed: &'s str) -> Vec<(&'s str, &'s str)> {
        let mut fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.push(("duration_ms", elapsed));
        fields
    }

    /// Logs `{name}_COMPLETE` at INFO
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.closed = true;
        let elapsed = self.elapsed_ms();
        let mut fields = self.closing_fields(&elapsed);
        fields.extend(extra.iter().copied());
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Logs `{name}_FAILED` at ERROR
    pub fn fail(mut self, reason: &str) {
        self.closed = true;
        let elapsed = self.elapsed_ms();
        let mut fields = self.closing_fields(&elapsed);
        fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }

    /// Logs `{name}_FAILED` at FATAL; the caller is about to exit
    pub fn fail_fatal(mut self, reason: &str) {
        self.closed = true;
        let elapsed = self.elapsed_ms();
        let mut fields = self.closing_fields(&elapsed);
        fields.push(("reason", reason));
        Logger::fatal(&format!("{}_FAILED", self.name), &fields);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn elapsed_ms(&self) -> String {
        self.started_at.elapsed().as_millis().to_string()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
