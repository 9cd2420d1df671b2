//! Open-ended document type.
//!
//! Documents have no fixed schema. They are stored as an ordered mapping from field
//! name to JSON value, and callers read fields back through typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::PayloadError;

/// Field holding the caller-supplied document identifier.
pub const ID_FIELD: &str = "id";
/// Engine metadata: index the document lives in.
pub const INDEX_META: &str = "_index";
/// Engine metadata: document identifier.
pub const ID_META: &str = "_id";
/// Engine metadata: document version.
pub const VERSION_META: &str = "_version";
/// Engine metadata: sequence number of the last write.
pub const SEQ_NO_META: &str = "_seq_no";
/// Engine metadata: primary term of the last write.
pub const PRIMARY_TERM_META: &str = "_primary_term";
/// Engine metadata: whether a read found the document.
pub const FOUND_META: &str = "_found";
/// Engine metadata: relevance score of a search hit.
pub const SCORE_META: &str = "_score";

/// A document stored in (or read from) the search engine.
///
/// The document may carry its own `id` field. When it does, the gateway uses it
/// as the engine document id; otherwise the engine assigns one.
///
/// # Example
///
/// ```
/// use bulk_gateway_shared::Document;
/// use serde_json::json;
///
/// let doc = Document::try_from(json!({
///     "id": "ned",
///     "character": "Ned Stark",
///     "quote": "Winter is coming."
/// }))
/// .expect("object payload");
///
/// assert_eq!(doc.id().as_deref(), Some("ned"));
/// assert_eq!(doc.get_str("character"), Some("Ned Stark"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The caller-supplied identifier, if any.
    ///
    /// String ids are returned as-is and numeric ids are rendered in decimal.
    /// Any other shape (including an empty string) counts as "no id".
    pub fn id(&self) -> Option<String> {
        match self.0.get(ID_FIELD)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Set the caller-supplied identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.0.insert(ID_FIELD.to_string(), Value::String(id.into()));
        self
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(Value::as_i64)
    }

    pub fn get_u64(&self, field: &str) -> Option<u64> {
        self.0.get(field).and_then(Value::as_u64)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.0.get(field).and_then(Value::as_bool)
    }

    /// Insert a field, returning the previous value if one was present.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Copy every field of `other` into this document, overwriting on collision.
    pub fn merge(&mut self, other: Document) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Document content without engine metadata fields (keys starting with `_`).
    pub fn content(&self) -> Document {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| !key.starts_with('_'))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Convert into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

impl TryFrom<Value> for Document {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(PayloadError::not_an_object(&other)),
        }
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
