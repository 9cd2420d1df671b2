//! Response normalizer.
//!
//! Projects the engine's verbose per-call responses onto the compact `ActionResult`
//! shape. Non-2xx responses are not errors here: they become results carrying the
//! engine status and an `error` payload, with identity fields filled from the request
//! when the engine body omits them.

use bulk_gateway_shared::types::document::{
    ID_META, INDEX_META, PRIMARY_TERM_META, SCORE_META, SEQ_NO_META, VERSION_META,
};
use bulk_gateway_shared::{ActionOutcome, ActionResult, Document};
use serde_json::{json, Value};

use crate::types::{EngineRequest, EngineResponse, OperationKind};

fn body_str(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

fn body_u64(body: &Value, key: &str) -> Option<u64> {
    body.get(key).and_then(Value::as_u64)
}

/// Outcome implied by the status code when the body carries no `result` tag.
fn outcome_from_status(status_code: u16, kind: OperationKind) -> ActionOutcome {
    match status_code {
        200..=299 => match kind {
            OperationKind::Index if status_code == 201 => ActionOutcome::Created,
            OperationKind::Index | OperationKind::Update | OperationKind::UpdateByQuery => {
                ActionOutcome::Updated
            }
            OperationKind::Delete | OperationKind::DeleteByQuery => ActionOutcome::Deleted,
            OperationKind::Get | OperationKind::Exists | OperationKind::Search => {
                ActionOutcome::Found
            }
        },
        404 => ActionOutcome::NotFound,
        _ => ActionOutcome::Failed,
    }
}

/// Failure detail for a non-2xx response.
///
/// Prefers the engine's `error` object. A plain not-found carries no detail; any other
/// failure falls back to the whole body, or a synthesized `{ "status": code }` when
/// the body is empty.
fn failure_detail(response: &EngineResponse, outcome: ActionOutcome) -> Option<Value> {
    if response.is_success() {
        return None;
    }
    match response.body.get("error") {
        Some(error) => Some(error.clone()),
        None if outcome == ActionOutcome::NotFound => None,
        None if response.body.is_null() => Some(json!({ "status": response.status_code })),
        None => Some(response.body.clone()),
    }
}

/// Identity fields from the body, falling back to the request.
fn identity(request: &EngineRequest, body: &Value) -> (Option<String>, Option<String>) {
    (
        body_str(body, INDEX_META).or_else(|| Some(request.index.clone())),
        body_str(body, ID_META).or_else(|| request.id.clone()),
    )
}

fn with_write_metadata(mut result: ActionResult, body: &Value) -> ActionResult {
    result.version = body_u64(body, VERSION_META);
    result.seq_no = body_u64(body, SEQ_NO_META);
    result.primary_term = body_u64(body, PRIMARY_TERM_META);
    result
}

/// Normalize any single-call response according to the request's operation kind.
///
/// Search responses are reduced to their status here; use
/// [`normalize_search_hits`] to extract the hits themselves.
pub fn normalize(request: &EngineRequest, response: EngineResponse) -> ActionResult {
    match request.kind {
        OperationKind::Index | OperationKind::Delete | OperationKind::Update => {
            normalize_write(request, response)
        }
        OperationKind::Get => normalize_get(request, response),
        OperationKind::Exists => normalize_exists(request, response),
        OperationKind::DeleteByQuery | OperationKind::UpdateByQuery => {
            normalize_by_query(request, response)
        }
        OperationKind::Search => {
            let outcome = outcome_from_status(response.status_code, request.kind);
            let mut result = ActionResult::new(response.status_code, outcome)
                .with_identity(Some(request.index.clone()), None);
            result.error = failure_detail(&response, outcome);
            result
        }
    }
}

/// Normalize an index, delete or update response.
///
/// Identity, version metadata and the `result` tag are lifted from the body.
pub fn normalize_write(request: &EngineRequest, response: EngineResponse) -> ActionResult {
    let body = &response.body;
    let outcome = body
        .get("result")
        .and_then(Value::as_str)
        .and_then(ActionOutcome::from_tag)
        .unwrap_or_else(|| outcome_from_status(response.status_code, request.kind));
    let (index, id) = identity(request, body);

    let mut result = with_write_metadata(
        ActionResult::new(response.status_code, outcome).with_identity(index, id),
        body,
    );
    result.error = failure_detail(&response, outcome);
    result
}

/// Normalize a get response.
///
/// A found document surfaces its metadata and its content at the top level. A missing
/// one surfaces only its identity fields.
pub fn normalize_get(request: &EngineRequest, response: EngineResponse) -> ActionResult {
    let status_code = response.status_code;
    let (index, id) = identity(request, &response.body);
    let found = response
        .body
        .get("found")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if response.is_success() && found {
        let mut result = with_write_metadata(
            ActionResult::new(status_code, ActionOutcome::Found).with_identity(index, id),
            &response.body,
        );
        result.found = Some(true);
        result.source = match response.body.get("_source") {
            Some(Value::Object(source)) => Document::from(source.clone()),
            _ => Document::new(),
        };
        return result;
    }

    let outcome = if response.is_success() || status_code == 404 {
        ActionOutcome::NotFound
    } else {
        ActionOutcome::Failed
    };
    let mut result = ActionResult::new(status_code, outcome).with_identity(index, id);
    result.found = Some(false);
    result.error = failure_detail(&response, outcome);
    result
}

/// Normalize an existence check. The engine answers `HEAD` with 200 or 404 and no body.
pub fn normalize_exists(request: &EngineRequest, response: EngineResponse) -> ActionResult {
    let status_code = response.status_code;
    let outcome = match status_code {
        200 => ActionOutcome::Found,
        404 => ActionOutcome::NotFound,
        _ => ActionOutcome::Failed,
    };

    let mut result = ActionResult::new(status_code, outcome)
        .with_identity(Some(request.index.clone()), request.id.clone());
    result.exists = Some(status_code == 200);
    if outcome == ActionOutcome::Failed {
        result.error = failure_detail(&response, outcome);
    }
    result
}

/// Normalize a delete-by-query or update-by-query response into aggregate counters.
///
/// Partial failures reported in the body's `failures` array are surfaced as the
/// `error` payload even when the status is 200.
pub fn normalize_by_query(request: &EngineRequest, response: EngineResponse) -> ActionResult {
    let body = &response.body;
    let outcome = outcome_from_status(response.status_code, request.kind);

    let mut result = ActionResult::new(response.status_code, outcome)
        .with_identity(Some(request.index.clone()), None);
    result.total = body_u64(body, "total");
    match request.kind {
        OperationKind::DeleteByQuery => result.deleted = body_u64(body, "deleted"),
        _ => result.updated = body_u64(body, "updated"),
    }

    result.error = failure_detail(&response, outcome).or_else(|| match body.get("failures") {
        Some(Value::Array(failures)) if !failures.is_empty() => Some(Value::Array(failures.clone())),
        _ => None,
    });
    result
}

/// Extract search hits as documents.
///
/// Each hit's `_source` is merged with its `_index`, `_id`, `_score`, `_version`,
/// `_seq_no` and `_primary_term`. Any status other than 200 yields no documents.
pub fn normalize_search_hits(response: &EngineResponse) -> Vec<Document> {
    if response.status_code != 200 {
        return Vec::new();
    }

    let Some(hits) = response
        .body
        .get("hits")
        .and_then(|hits| hits.get("hits"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    hits.iter()
        .map(|hit| {
            let mut doc = match hit.get("_source") {
                Some(Value::Object(source)) => Document::from(source.clone()),
                _ => Document::new(),
            };
            for key in [
                INDEX_META,
                ID_META,
                SCORE_META,
                VERSION_META,
                SEQ_NO_META,
                PRIMARY_TERM_META,
            ] {
                match hit.get(key) {
                    Some(Value::Null) | None => {}
                    Some(value) => {
                        doc.insert(key, value.clone());
                    }
                }
            }
            doc
        })
        .collect()
}
