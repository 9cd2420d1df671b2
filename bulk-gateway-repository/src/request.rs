//! Request builder.
//!
//! Turns a gateway call (index, document or id, options) into the engine request
//! descriptor. Every function here is a pure transformation: no I/O, no failure modes.
//! Inputs are validated by the gateway before they reach the builder.

use bulk_gateway_shared::{Document, OperationOptions, QueryUpdate, UpdateSpec};
use serde_json::Value;

use crate::types::{EngineMethod, EngineRequest, OperationKind};
use crate::utils::encode_segment;

/// Option keys the builder owns; caller options using them are dropped so the
/// explicit index, id and body always win.
const RESERVED_OPTION_KEYS: [&str; 3] = ["index", "id", "body"];

/// Convert caller options into query-string pairs.
///
/// Strings are passed as-is, arrays are comma-joined (the engine's multi-value
/// convention), nulls are skipped and everything else uses its JSON rendering.
fn query_pairs(options: Option<&OperationOptions>) -> Vec<(String, String)> {
    let Some(options) = options else {
        return Vec::new();
    };

    options
        .iter()
        .filter(|(key, _)| !RESERVED_OPTION_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| query_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

fn doc_path(index: &str, endpoint: &str, id: &str) -> String {
    format!(
        "/{}/{}/{}",
        encode_segment(index),
        endpoint,
        encode_segment(id)
    )
}

fn by_id(
    kind: OperationKind,
    method: EngineMethod,
    endpoint: &str,
    index: &str,
    id: &str,
    body: Option<Value>,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    EngineRequest {
        kind,
        method,
        path: doc_path(index, endpoint, id),
        index: index.to_string(),
        id: Some(id.to_string()),
        query: query_pairs(options),
        body,
    }
}

/// Build the request that writes one document.
///
/// The document's own `id` field becomes the engine id (`PUT /{index}/_doc/{id}`).
/// Without one the id is omitted (`POST /{index}/_doc`) and the engine assigns it.
/// The document is sent unchanged as the body.
pub fn build_index_request(
    index: &str,
    doc: &Document,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    let id = doc.id();
    let (method, path) = match id {
        Some(ref id) => (EngineMethod::Put, doc_path(index, "_doc", id)),
        None => (EngineMethod::Post, format!("/{}/_doc", encode_segment(index))),
    };

    EngineRequest {
        kind: OperationKind::Index,
        method,
        path,
        index: index.to_string(),
        id,
        query: query_pairs(options),
        body: Some(doc.clone().into_value()),
    }
}

pub fn build_get_request(
    index: &str,
    id: &str,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    by_id(
        OperationKind::Get,
        EngineMethod::Get,
        "_doc",
        index,
        id,
        None,
        options,
    )
}

pub fn build_exists_request(
    index: &str,
    id: &str,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    by_id(
        OperationKind::Exists,
        EngineMethod::Head,
        "_doc",
        index,
        id,
        None,
        options,
    )
}

pub fn build_delete_request(
    index: &str,
    id: &str,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    by_id(
        OperationKind::Delete,
        EngineMethod::Delete,
        "_doc",
        index,
        id,
        None,
        options,
    )
}

/// Build a partial-update request; the update payload is forwarded as-is.
pub fn build_update_request(
    index: &str,
    id: &str,
    update: &UpdateSpec,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    by_id(
        OperationKind::Update,
        EngineMethod::Post,
        "_update",
        index,
        id,
        Some(update.to_body()),
        options,
    )
}

/// Build a delete-by-query request spanning one or more indices.
///
/// The query payload is opaque and becomes the request body unchanged.
pub fn build_delete_by_query_request(
    indices: &[String],
    query: &Value,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    let joined = indices
        .iter()
        .map(|index| encode_segment(index))
        .collect::<Vec<_>>()
        .join(",");

    EngineRequest {
        kind: OperationKind::DeleteByQuery,
        method: EngineMethod::Post,
        path: format!("/{}/_delete_by_query", joined),
        index: indices.join(","),
        id: None,
        query: query_pairs(options),
        body: Some(query.clone()),
    }
}

pub fn build_update_by_query_request(
    index: &str,
    update: &QueryUpdate,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    EngineRequest {
        kind: OperationKind::UpdateByQuery,
        method: EngineMethod::Post,
        path: format!("/{}/_update_by_query", encode_segment(index)),
        index: index.to_string(),
        id: None,
        query: query_pairs(options),
        body: Some(update.to_body()),
    }
}

pub fn build_search_request(
    index: &str,
    query: &Value,
    options: Option<&OperationOptions>,
) -> EngineRequest {
    EngineRequest {
        kind: OperationKind::Search,
        method: EngineMethod::Post,
        path: format!("/{}/_search", encode_segment(index)),
        index: index.to_string(),
        id: None,
        query: query_pairs(options),
        body: Some(query.clone()),
    }
}
