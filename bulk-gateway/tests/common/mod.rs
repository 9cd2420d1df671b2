//! In-memory search engine used by the integration tests.
//!
//! Implements just enough of the engine's document API to exercise the gateway end
//! to end: single-document CRUD with versions and sequence numbers, a small query
//! subset (`match_all`, `match`, `term`), one-line painless-style scripts, and
//! by-query operations. It also records how many requests are in flight at once.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bulk_gateway::{EngineRequest, EngineResponse, GatewayError, OperationKind, SearchEngine};
use serde_json::{json, Map, Value};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredDoc {
    source: Map<String, Value>,
    version: u64,
    seq_no: u64,
}

type Index = BTreeMap<String, StoredDoc>;

pub struct InMemoryEngine {
    indices: Mutex<HashMap<String, Index>>,
    seq_no: AtomicU64,
    delay: Duration,
    unreachable: AtomicBool,
    healthy: AtomicBool,
    closed: AtomicBool,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Every request sleeps for `delay` before being handled.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            indices: Mutex::new(HashMap::new()),
            seq_no: AtomicU64::new(0),
            delay,
            unreachable: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent request fail at the transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn doc_count(&self, index: &str) -> usize {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn next_seq_no(&self) -> u64 {
        self.seq_no.fetch_add(1, Ordering::SeqCst)
    }

    fn handle(&self, request: &EngineRequest) -> EngineResponse {
        match request.kind {
            OperationKind::Index => self.index(request),
            OperationKind::Get => self.get(request),
            OperationKind::Exists => self.exists(request),
            OperationKind::Delete => self.delete(request),
            OperationKind::Update => self.update(request),
            OperationKind::DeleteByQuery => self.delete_by_query(request),
            OperationKind::UpdateByQuery => self.update_by_query(request),
            OperationKind::Search => self.search(request),
        }
    }

    fn index(&self, request: &EngineRequest) -> EngineResponse {
        let source = request
            .body
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let create_only = request.query_param("op_type") == Some("create");
        let seq_no = self.next_seq_no();

        let mut indices = self.indices.lock().unwrap();
        let docs = indices.entry(request.index.clone()).or_default();

        let (status, result, version) = match docs.get_mut(&id) {
            Some(_) if create_only => {
                return EngineResponse::new(
                    409,
                    json!({
                        "error": {
                            "type": "version_conflict_engine_exception",
                            "reason": format!("[{}]: version conflict, document already exists", id)
                        },
                        "status": 409
                    }),
                );
            }
            Some(stored) => {
                stored.source = source;
                stored.version += 1;
                stored.seq_no = seq_no;
                (200, "updated", stored.version)
            }
            None => {
                docs.insert(
                    id.clone(),
                    StoredDoc {
                        source,
                        version: 1,
                        seq_no,
                    },
                );
                (201, "created", 1)
            }
        };

        EngineResponse::new(status, write_body(&request.index, &id, version, result, seq_no))
    }

    fn get(&self, request: &EngineRequest) -> EngineResponse {
        let id = request.id.clone().unwrap_or_default();
        let indices = self.indices.lock().unwrap();
        let Some(docs) = indices.get(&request.index) else {
            return index_not_found(&request.index);
        };

        match docs.get(&id) {
            Some(stored) => EngineResponse::new(
                200,
                json!({
                    "_index": request.index,
                    "_id": id,
                    "_version": stored.version,
                    "_seq_no": stored.seq_no,
                    "_primary_term": 1,
                    "found": true,
                    "_source": stored.source
                }),
            ),
            None => EngineResponse::new(
                404,
                json!({ "_index": request.index, "_id": id, "found": false }),
            ),
        }
    }

    fn exists(&self, request: &EngineRequest) -> EngineResponse {
        let id = request.id.clone().unwrap_or_default();
        let indices = self.indices.lock().unwrap();
        let found = indices
            .get(&request.index)
            .is_some_and(|docs| docs.contains_key(&id));
        EngineResponse::new(if found { 200 } else { 404 }, Value::Null)
    }

    fn delete(&self, request: &EngineRequest) -> EngineResponse {
        let id = request.id.clone().unwrap_or_default();
        let seq_no = self.next_seq_no();
        let mut indices = self.indices.lock().unwrap();
        let removed = indices
            .get_mut(&request.index)
            .and_then(|docs| docs.remove(&id));

        match removed {
            Some(stored) => EngineResponse::new(
                200,
                write_body(&request.index, &id, stored.version + 1, "deleted", seq_no),
            ),
            None => EngineResponse::new(
                404,
                write_body(&request.index, &id, 1, "not_found", seq_no),
            ),
        }
    }

    fn update(&self, request: &EngineRequest) -> EngineResponse {
        let id = request.id.clone().unwrap_or_default();
        let body = request.body.clone().unwrap_or(Value::Null);
        let seq_no = self.next_seq_no();
        let mut indices = self.indices.lock().unwrap();

        let Some(stored) = indices
            .get_mut(&request.index)
            .and_then(|docs| docs.get_mut(&id))
        else {
            return EngineResponse::new(
                404,
                json!({
                    "error": {
                        "type": "document_missing_exception",
                        "reason": format!("[_doc][{}]: document missing", id),
                        "index": request.index
                    },
                    "status": 404
                }),
            );
        };

        let before = stored.source.clone();
        if let Err(reason) = apply_update(&mut stored.source, &body) {
            return EngineResponse::new(
                400,
                json!({
                    "error": { "type": "script_exception", "reason": reason },
                    "status": 400
                }),
            );
        }

        if stored.source == before {
            return EngineResponse::new(
                200,
                write_body(&request.index, &id, stored.version, "noop", stored.seq_no),
            );
        }

        stored.version += 1;
        stored.seq_no = seq_no;
        EngineResponse::new(
            200,
            write_body(&request.index, &id, stored.version, "updated", seq_no),
        )
    }

    fn delete_by_query(&self, request: &EngineRequest) -> EngineResponse {
        let query = request.body.as_ref().and_then(|body| body.get("query"));
        let mut indices = self.indices.lock().unwrap();

        let mut deleted = 0u64;
        for index in request.index.split(',') {
            let Some(docs) = indices.get_mut(index) else {
                return index_not_found(index);
            };
            let before = docs.len();
            docs.retain(|_, stored| !matches_query(query, &stored.source));
            deleted += (before - docs.len()) as u64;
        }

        EngineResponse::new(
            200,
            json!({
                "took": 1,
                "timed_out": false,
                "total": deleted,
                "deleted": deleted,
                "batches": 1,
                "version_conflicts": 0,
                "failures": []
            }),
        )
    }

    fn update_by_query(&self, request: &EngineRequest) -> EngineResponse {
        let body = request.body.clone().unwrap_or(Value::Null);
        let query = body.get("query");
        let mut indices = self.indices.lock().unwrap();
        let Some(docs) = indices.get_mut(&request.index) else {
            return index_not_found(&request.index);
        };

        let mut total = 0u64;
        let mut updated = 0u64;
        for stored in docs.values_mut() {
            if !matches_query(query, &stored.source) {
                continue;
            }
            total += 1;
            let before = stored.source.clone();
            if let Err(reason) = apply_update(&mut stored.source, &body) {
                return EngineResponse::new(
                    400,
                    json!({
                        "error": { "type": "script_exception", "reason": reason },
                        "status": 400
                    }),
                );
            }
            if stored.source != before {
                stored.version += 1;
                stored.seq_no = self.next_seq_no();
                updated += 1;
            }
        }

        EngineResponse::new(
            200,
            json!({
                "took": 1,
                "timed_out": false,
                "total": total,
                "updated": updated,
                "noops": total - updated,
                "failures": []
            }),
        )
    }

    fn search(&self, request: &EngineRequest) -> EngineResponse {
        let query = request.body.as_ref().and_then(|body| body.get("query"));
        let with_seq_no = request.query_param("seq_no_primary_term") == Some("true");
        let with_version = request.query_param("version") == Some("true");

        let indices = self.indices.lock().unwrap();
        let Some(docs) = indices.get(&request.index) else {
            return index_not_found(&request.index);
        };

        let hits: Vec<Value> = docs
            .iter()
            .filter(|(_, stored)| matches_query(query, &stored.source))
            .map(|(id, stored)| {
                let mut hit = json!({
                    "_index": request.index,
                    "_id": id,
                    "_score": 1.0,
                    "_source": stored.source
                });
                if with_seq_no {
                    hit["_seq_no"] = json!(stored.seq_no);
                    hit["_primary_term"] = json!(1);
                }
                if with_version {
                    hit["_version"] = json!(stored.version);
                }
                hit
            })
            .collect();

        EngineResponse::new(
            200,
            json!({
                "took": 1,
                "timed_out": false,
                "hits": {
                    "total": { "value": hits.len(), "relation": "eq" },
                    "max_score": 1.0,
                    "hits": hits
                }
            }),
        )
    }
}

#[async_trait]
impl SearchEngine for InMemoryEngine {
    async fn send(&self, request: &EngineRequest) -> Result<EngineResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = if self.unreachable.load(Ordering::SeqCst) {
            Err(GatewayError::transport("error sending request: connection refused"))
        } else {
            Ok(self.handle(request))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    async fn health_check(&self) -> Result<bool, GatewayError> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    async fn close(&self) -> Result<(), GatewayError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn write_body(index: &str, id: &str, version: u64, result: &str, seq_no: u64) -> Value {
    json!({
        "_index": index,
        "_id": id,
        "_version": version,
        "result": result,
        "_shards": { "total": 2, "successful": 1, "failed": 0 },
        "_seq_no": seq_no,
        "_primary_term": 1
    })
}

fn index_not_found(index: &str) -> EngineResponse {
    EngineResponse::new(
        404,
        json!({
            "error": {
                "type": "index_not_found_exception",
                "reason": format!("no such index [{}]", index),
                "index": index
            },
            "status": 404
        }),
    )
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `match_all`, `match` (any token) and `term` (exact value). No query matches everything.
fn matches_query(query: Option<&Value>, source: &Map<String, Value>) -> bool {
    let Some(query) = query else {
        return true;
    };

    if query.get("match_all").is_some() {
        return true;
    }

    if let Some(Value::Object(clauses)) = query.get("match") {
        return clauses.iter().all(|(field, expected)| {
            let expected = expected.get("query").unwrap_or(expected);
            let wanted = tokens(&value_text(expected));
            let have = source
                .get(field)
                .map(|v| tokens(&value_text(v)))
                .unwrap_or_default();
            wanted.iter().any(|t| have.contains(t))
        });
    }

    if let Some(Value::Object(clauses)) = query.get("term") {
        return clauses.iter().all(|(field, expected)| {
            let expected = expected.get("value").unwrap_or(expected);
            source.get(field) == Some(expected)
        });
    }

    false
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Apply a `{"doc": ...}` merge or a `{"script": ...}` to a stored source.
fn apply_update(source: &mut Map<String, Value>, body: &Value) -> Result<(), String> {
    if let Some(Value::Object(doc)) = body.get("doc") {
        for (key, value) in doc {
            source.insert(key.clone(), value.clone());
        }
        return Ok(());
    }

    let Some(script) = body.get("script") else {
        return Err("update requires [doc] or [script]".to_string());
    };
    let code = script
        .get("source")
        .and_then(Value::as_str)
        .ok_or("script is missing [source]")?;
    let empty = Map::new();
    let params = script
        .get("params")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    for statement in code.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        run_statement(source, statement, params)?;
    }
    Ok(())
}

/// Supports `ctx._source.f++`, `ctx._source.f += n` and `ctx._source.f = literal`.
fn run_statement(
    source: &mut Map<String, Value>,
    statement: &str,
    params: &Map<String, Value>,
) -> Result<(), String> {
    let rest = statement
        .strip_prefix("ctx._source.")
        .ok_or_else(|| format!("unsupported statement: {}", statement))?;

    if let Some(field) = rest.strip_suffix("++") {
        let current = source.get(field.trim()).and_then(Value::as_i64).unwrap_or(0);
        source.insert(field.trim().to_string(), json!(current + 1));
        return Ok(());
    }

    if let Some((field, amount)) = rest.split_once("+=") {
        let amount = literal(amount.trim(), params)?
            .as_i64()
            .ok_or("can only add numbers")?;
        let current = source.get(field.trim()).and_then(Value::as_i64).unwrap_or(0);
        source.insert(field.trim().to_string(), json!(current + amount));
        return Ok(());
    }

    if let Some((field, value)) = rest.split_once('=') {
        let value = literal(value.trim(), params)?;
        source.insert(field.trim().to_string(), value);
        return Ok(());
    }

    Err(format!("unsupported statement: {}", statement))
}

fn literal(text: &str, params: &Map<String, Value>) -> Result<Value, String> {
    if let Some(name) = text.strip_prefix("params.") {
        return params
            .get(name)
            .cloned()
            .ok_or_else(|| format!("missing param [{}]", name));
    }
    if let Some(inner) = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
    {
        return Ok(Value::String(inner.to_string()));
    }
    serde_json::from_str(text).map_err(|_| format!("cannot parse literal: {}", text))
}
