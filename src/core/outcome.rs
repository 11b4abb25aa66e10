//! Result of a save

use crate::document::Document;

/// The document as persisted, and whether the save created it.
///
/// Built once per save, normally by the terminal persist step. A hook that
/// short-circuits the chain builds its own.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    document: Document,
    is_new: bool,
}

impl SaveOutcome {
    pub fn new(document: Document, is_new: bool) -> Self {
        Self { document, is_new }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// True if no document with this id existed when the save began
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn into_parts(self) -> (Document, bool) {
        (self.document, self.is_new)
    }
}
