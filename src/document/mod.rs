//! Schemaless documents
//!
//! A document is a unique, immutable `id` plus an open, ordered set of
//! fields. On the wire it is a flat JSON object: the `"id"` member is the
//! identifier and every other member is a field.

mod errors;

pub use errors::{DocumentError, DocumentResult};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier member on the wire
pub const ID_FIELD: &str = "id";

/// Ordered field mapping of a document
pub type Fields = Map<String, Value>;

/// A schemaless record keyed by a unique id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireDocument")]
pub struct Document {
    id: String,
    #[serde(flatten)]
    fields: Fields,
}

/// Unvalidated wire shape, checked before it becomes a `Document`
#[derive(Deserialize)]
struct WireDocument {
    id: String,
    #[serde(flatten)]
    fields: Fields,
}

impl TryFrom<WireDocument> for Document {
    type Error = DocumentError;

    fn try_from(wire: WireDocument) -> DocumentResult<Self> {
        Document::new(wire.id, wire.fields)
    }
}

impl Document {
    /// Create a document, rejecting an empty id or an `"id"` field
    pub fn new(id: impl Into<String>, fields: Fields) -> DocumentResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(DocumentError::EmptyId);
        }
        if fields.contains_key(ID_FIELD) {
            return Err(DocumentError::ReservedField(ID_FIELD.to_string()));
        }
        Ok(Self { id, fields })
    }

    /// Create a document with no fields
    pub fn empty(id: impl Into<String>) -> DocumentResult<Self> {
        Self::new(id, Fields::new())
    }

    /// Build a document from a JSON object that carries its own `"id"`
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        match value {
            Value::Object(mut fields) => {
                let id = match fields.shift_remove(ID_FIELD) {
                    Some(Value::String(id)) => id,
                    Some(_) => return Err(DocumentError::InvalidId),
                    None => return Err(DocumentError::MissingId),
                };
                Self::new(id, fields)
            }
            _ => Err(DocumentError::NotAnObject),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Look up a single field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field, keeping insertion order for new keys.
    ///
    /// The id is not a field and cannot be replaced this way.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> DocumentResult<Option<Value>> {
        let key = key.into();
        if key == ID_FIELD {
            return Err(DocumentError::ReservedField(key));
        }
        Ok(self.fields.insert(key, value))
    }

    /// Remove a field, preserving the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn into_parts(self) -> (String, Fields) {
        (self.id, self.fields)
    }

    /// Flat JSON object with `"id"` first
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}
