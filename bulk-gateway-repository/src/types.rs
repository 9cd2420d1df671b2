//! Request and response descriptors exchanged with the search engine.

use serde_json::Value;

/// HTTP method of an engine request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

/// The logical gateway operation a request belongs to.
///
/// The normalizer uses it to pick the right projection of the engine response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Index,
    Get,
    Exists,
    Delete,
    Update,
    DeleteByQuery,
    UpdateByQuery,
    Search,
}

/// Engine-specific request descriptor produced by the request builder.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub kind: OperationKind,
    pub method: EngineMethod,
    /// URL path, with index names and ids already percent-encoded.
    pub path: String,
    /// Target index (comma-joined when the operation spans several).
    pub index: String,
    /// Target document id; `None` lets the engine assign one on index.
    pub id: Option<String>,
    /// Query-string parameters built from the caller's options.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl EngineRequest {
    /// Look up a query-string parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw engine response: status code plus decoded JSON body.
///
/// Bodies that are empty (e.g. `HEAD` responses) decode to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    pub status_code: u16,
    pub body: Value,
}

impl EngineResponse {
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
