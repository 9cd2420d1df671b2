//! Update payloads.
//!
//! An update is either a partial document merged into the stored one, or a script the
//! engine runs against each targeted document. The gateway forwards both untouched.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::PayloadError;
use crate::types::document::Document;

/// A script executed server-side by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Script language tag, e.g. `painless`.
    pub lang: String,
    /// Script source code.
    pub source: String,
    /// Named parameters made available to the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl Script {
    pub fn new(lang: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            source: source.into(),
            params: None,
        }
    }

    /// A Painless script, the engine's default language.
    pub fn painless(source: impl Into<String>) -> Self {
        Self::new("painless", source)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut script = Map::new();
        script.insert("lang".to_string(), Value::String(self.lang.clone()));
        script.insert("source".to_string(), Value::String(self.source.clone()));
        if let Some(ref params) = self.params {
            script.insert("params".to_string(), Value::Object(params.clone()));
        }
        Value::Object(script)
    }
}

/// Update applied to documents addressed by id.
///
/// Serializes to the engine's update body: `{"doc": {...}}` or `{"script": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSpec {
    /// Fields merged into the stored document.
    Doc(Document),
    /// Script run against the stored document.
    Script(Script),
}

impl UpdateSpec {
    pub fn doc(doc: Document) -> Self {
        Self::Doc(doc)
    }

    pub fn script(script: Script) -> Self {
        Self::Script(script)
    }

    /// Engine request body for this update.
    pub fn to_body(&self) -> Value {
        match self {
            Self::Doc(doc) => json!({ "doc": doc.as_map() }),
            Self::Script(script) => json!({ "script": script.to_value() }),
        }
    }
}

/// Build an `UpdateSpec` from a raw `{doc}` or `{script}` payload.
///
/// Payloads carrying both variants, or neither, are rejected.
impl TryFrom<Value> for UpdateSpec {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut map = match value {
            Value::Object(map) => map,
            other => return Err(PayloadError::not_an_object(&other)),
        };

        match (map.remove("doc"), map.remove("script")) {
            (Some(_), Some(_)) => Err(PayloadError::AmbiguousUpdate),
            (None, None) => Err(PayloadError::MissingUpdate),
            (Some(doc), None) => Document::try_from(doc)
                .map(Self::Doc)
                .map_err(|e| PayloadError::invalid_field("doc", e.to_string())),
            (None, Some(script)) => serde_json::from_value::<Script>(script)
                .map(Self::Script)
                .map_err(|e| PayloadError::invalid_field("script", e.to_string())),
        }
    }
}

/// Update applied to every document a query selects.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryUpdate {
    pub update: UpdateSpec,
    /// Query selecting the documents to update; `None` selects every document.
    pub query: Option<Value>,
}

impl QueryUpdate {
    pub fn new(update: UpdateSpec, query: Value) -> Self {
        Self {
            update,
            query: Some(query),
        }
    }

    /// Apply the update to every document in the index.
    pub fn all(update: UpdateSpec) -> Self {
        Self {
            update,
            query: None,
        }
    }

    /// Engine request body: the update payload with the query embedded.
    pub fn to_body(&self) -> Value {
        let mut body = self.update.to_body();
        if let (Value::Object(map), Some(query)) = (&mut body, &self.query) {
            map.insert("query".to_string(), query.clone());
        }
        body
    }
}

/// Build a `QueryUpdate` from a raw `{script, query}` (or `{doc, query}`) payload.
impl TryFrom<Value> for QueryUpdate {
    type Error = PayloadError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut map = match value {
            Value::Object(map) => map,
            other => return Err(PayloadError::not_an_object(&other)),
        };
        let query = map.remove("query");
        let update = UpdateSpec::try_from(Value::Object(map))?;
        Ok(Self { update, query })
    }
}
