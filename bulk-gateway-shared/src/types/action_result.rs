//! Uniform result record for gateway operations.
//!
//! Every gateway operation, whatever engine endpoint it hits, reports its outcome as an
//! `ActionResult`. Batch operations return one record per input item, in input order.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::types::document::{
    Document, FOUND_META, ID_META, INDEX_META, PRIMARY_TERM_META, SEQ_NO_META, VERSION_META,
};

const STATUS_CODE_FIELD: &str = "_statusCode";

/// Top-level names owned by the record itself. Document content under one of these
/// names is left out of the serialized form.
pub const RESERVED_FIELDS: [&str; 13] = [
    STATUS_CODE_FIELD,
    INDEX_META,
    ID_META,
    VERSION_META,
    SEQ_NO_META,
    PRIMARY_TERM_META,
    FOUND_META,
    "result",
    "exists",
    "total",
    "updated",
    "deleted",
    "error",
];

/// Outcome tag of a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// A new document was written.
    Created,
    /// An existing document was overwritten or modified.
    Updated,
    /// A document was removed.
    Deleted,
    /// The targeted document does not exist.
    NotFound,
    /// The engine accepted the call but changed nothing.
    Noop,
    /// A read or existence check located the document.
    Found,
    /// The engine rejected the operation; see `ActionResult::error`.
    Failed,
}

impl ActionOutcome {
    /// Parse the engine's `result` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            "not_found" => Some(Self::NotFound),
            "noop" => Some(Self::Noop),
            "found" => Some(Self::Found),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::NotFound => "not_found",
            Self::Noop => "noop",
            Self::Found => "found",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized outcome of one document operation.
///
/// `status_code` and `result` are always set. Every other field reflects what the
/// engine returned and is omitted from the serialized form when absent. For reads,
/// the document content is flattened into the top level of the record, except for
/// content fields named like one of [`RESERVED_FIELDS`]; those stay readable through
/// [`ActionResult::get`] but are not serialized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionResult {
    /// HTTP status code reported by the engine.
    #[serde(rename = "_statusCode")]
    pub status_code: u16,

    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    #[serde(rename = "_seq_no", default, skip_serializing_if = "Option::is_none")]
    pub seq_no: Option<u64>,

    #[serde(rename = "_primary_term", default, skip_serializing_if = "Option::is_none")]
    pub primary_term: Option<u64>,

    /// Set on reads: whether the document was found.
    #[serde(rename = "_found", default, skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,

    /// Outcome tag.
    pub result: ActionOutcome,

    /// Set on existence checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,

    /// Query-scoped operations: number of documents the query selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Update-by-query: number of documents updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<u64>,

    /// Delete-by-query: number of documents deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,

    /// Engine failure detail, present only when the operation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,

    /// Document content returned by a read.
    #[serde(flatten)]
    pub source: Document,
}

impl ActionResult {
    /// Create a result with only the mandatory fields set.
    pub fn new(status_code: u16, result: ActionOutcome) -> Self {
        Self {
            status_code,
            index: None,
            id: None,
            version: None,
            seq_no: None,
            primary_term: None,
            found: None,
            result,
            exists: None,
            total: None,
            updated: None,
            deleted: None,
            error: None,
            source: Document::new(),
        }
    }

    /// Attach identity fields.
    pub fn with_identity(mut self, index: Option<String>, id: Option<String>) -> Self {
        self.index = index;
        self.id = id;
        self
    }

    /// Whether the engine reported a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Read a content field of a fetched document.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.source.get(field)
    }
}

impl Serialize for ActionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(STATUS_CODE_FIELD, &self.status_code)?;
        if let Some(index) = &self.index {
            map.serialize_entry(INDEX_META, index)?;
        }
        if let Some(id) = &self.id {
            map.serialize_entry(ID_META, id)?;
        }
        if let Some(version) = self.version {
            map.serialize_entry(VERSION_META, &version)?;
        }
        if let Some(seq_no) = self.seq_no {
            map.serialize_entry(SEQ_NO_META, &seq_no)?;
        }
        if let Some(primary_term) = self.primary_term {
            map.serialize_entry(PRIMARY_TERM_META, &primary_term)?;
        }
        if let Some(found) = self.found {
            map.serialize_entry(FOUND_META, &found)?;
        }
        map.serialize_entry("result", &self.result)?;
        if let Some(exists) = self.exists {
            map.serialize_entry("exists", &exists)?;
        }
        if let Some(total) = self.total {
            map.serialize_entry("total", &total)?;
        }
        if let Some(updated) = self.updated {
            map.serialize_entry("updated", &updated)?;
        }
        if let Some(deleted) = self.deleted {
            map.serialize_entry("deleted", &deleted)?;
        }
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        for (field, value) in self.source.iter() {
            if RESERVED_FIELDS.contains(&field.as_str()) {
                warn!(
                    field = %field,
                    id = self.id.as_deref().unwrap_or_default(),
                    "Document field shadows a result field; leaving it out"
                );
                continue;
            }
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}
