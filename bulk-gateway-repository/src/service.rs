//! Bulk document gateway implementation.
//!
//! This module provides the main service for running document operations against the
//! search engine. Multi-item operations fan out one engine request per item under the
//! configured concurrency ceiling and return one `ActionResult` per item, in input order.
//!
//! # Failure semantics
//!
//! Engine-reported failures (404, 409, 400, ...) never abort a batch: they are
//! normalized into the item's `ActionResult`. Only a transport failure, where no
//! response was received, fails the whole call. The rest of the batch still runs to
//! completion before the first transport error is returned.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::fan_out::fan_out;
use crate::interfaces::SearchEngine;
use crate::normalize::{normalize, normalize_search_hits};
use crate::opensearch::OpenSearchEngine;
use crate::request::{
    build_delete_by_query_request, build_delete_request, build_exists_request,
    build_get_request, build_index_request, build_search_request,
    build_update_by_query_request, build_update_request,
};
use crate::types::EngineRequest;
use crate::utils::{validate_ids, validate_index};
use bulk_gateway_shared::{
    ActionOutcome, ActionResult, Document, OneOrMany, OperationOptions, QueryUpdate, UpdateSpec,
};

/// The main service for bulk document operations.
///
/// Holds a shared handle to a `SearchEngine` and the gateway configuration. The gateway
/// keeps no mutable state between calls, so overlapping operations on the same instance
/// are safe.
///
/// # Example
///
/// ```no_run
/// use bulk_gateway_repository::{BulkDocumentGateway, Document, GatewayConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = BulkDocumentGateway::connect(GatewayConfig::new("http://localhost:9200"))?;
///
/// let docs = vec![
///     Document::new().with("character", "Ned Stark").with("quote", "Winter is coming."),
///     Document::new().with("character", "Daenerys Targaryen").with("quote", "I am the blood of the dragon."),
/// ];
/// let results = gateway.index_many("game-of-thrones", docs, None).await?;
/// assert_eq!(results.len(), 2);
///
/// gateway.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct BulkDocumentGateway {
    engine: Arc<dyn SearchEngine>,
    config: GatewayConfig,
}

impl BulkDocumentGateway {
    /// Create a new gateway with default configuration.
    ///
    /// The default configuration runs 5 operations at once and limits batches to
    /// 1000 items.
    ///
    /// # Arguments
    ///
    /// * `engine` - A shared implementation of `SearchEngine` (e.g., `OpenSearchEngine`)
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self {
            engine,
            config: GatewayConfig::default(),
        }
    }

    /// Create a new gateway with custom configuration.
    pub fn with_config(engine: Arc<dyn SearchEngine>, config: GatewayConfig) -> Self {
        Self { engine, config }
    }

    /// Create a gateway backed by an `OpenSearchEngine` for `config.url`.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkDocumentGateway)` - A gateway ready for use
    /// * `Err(GatewayError::ConnectionError)` - If the engine transport cannot be built
    pub fn connect(config: GatewayConfig) -> Result<Self, GatewayError> {
        let engine = OpenSearchEngine::new(&config)?;
        Ok(Self::with_config(Arc::new(engine), config))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), GatewayError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(GatewayError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Send one request per item under the concurrency ceiling and normalize each response.
    async fn dispatch(
        &self,
        requests: Vec<EngineRequest>,
    ) -> Result<Vec<ActionResult>, GatewayError> {
        let engine = &self.engine;
        let outcomes = fan_out(requests, self.config.concurrency, |request| async move {
            let response = engine.send(&request).await?;
            Ok::<_, GatewayError>(normalize(&request, response))
        })
        .await;

        let results = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

        let failed = results
            .iter()
            .filter(|result| result.result == ActionOutcome::Failed)
            .count();
        if failed > 0 {
            warn!(
                total = results.len(),
                failed, "Engine rejected some items of the batch"
            );
        }

        Ok(results)
    }

    /// Prepare a by-id batch: validate inputs and build one request per id.
    fn by_id_requests<F>(
        &self,
        index: &str,
        ids: OneOrMany<String>,
        build: F,
    ) -> Result<Vec<EngineRequest>, GatewayError>
    where
        F: Fn(&str) -> EngineRequest,
    {
        validate_index(index)?;
        let ids = ids.into_vec();
        validate_ids(&ids)?;
        self.validate_batch_size(ids.len())?;
        Ok(ids.iter().map(|id| build(id.as_str())).collect())
    }

    /// Write documents into an index, one engine request per document.
    ///
    /// A document's `id` field becomes its engine id; documents without one get an
    /// engine-assigned id, reported in the result.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name
    /// * `docs` - A single document or a list of documents
    /// * `options` - Engine options forwarded as query parameters (e.g. `refresh`)
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ActionResult>)` - One result per document, in input order
    /// * `Err(GatewayError::ValidationError)` - If the index name is invalid
    /// * `Err(GatewayError::BatchSizeExceeded)` - If too many documents are provided
    /// * `Err(GatewayError::TransportError)` - If the engine could not be reached
    #[instrument(skip_all, fields(index = %index))]
    pub async fn index_many(
        &self,
        index: &str,
        docs: impl Into<OneOrMany<Document>>,
        options: Option<&OperationOptions>,
    ) -> Result<Vec<ActionResult>, GatewayError> {
        validate_index(index)?;
        let docs = docs.into().into_vec();
        self.validate_batch_size(docs.len())?;

        debug!(batch_size = docs.len(), "Indexing documents");
        let requests = docs
            .iter()
            .map(|doc| build_index_request(index, doc, options))
            .collect();
        self.dispatch(requests).await
    }

    /// Fetch documents by id.
    ///
    /// Found documents come back with their content and metadata; missing ones come
    /// back as a stub carrying only `_index`, `_id` and `found == false`.
    #[instrument(skip_all, fields(index = %index))]
    pub async fn get_by_id(
        &self,
        index: &str,
        ids: impl Into<OneOrMany<String>>,
        options: Option<&OperationOptions>,
    ) -> Result<Vec<ActionResult>, GatewayError> {
        let requests =
            self.by_id_requests(index, ids.into(), |id| build_get_request(index, id, options))?;
        debug!(batch_size = requests.len(), "Getting documents");
        self.dispatch(requests).await
    }

    /// Delete documents by id.
    ///
    /// Deleting a missing document yields a `not_found` result with status 404, not
    /// an error, so repeated deletes are safe.
    #[instrument(skip_all, fields(index = %index))]
    pub async fn delete_by_id(
        &self,
        index: &str,
        ids: impl Into<OneOrMany<String>>,
        options: Option<&OperationOptions>,
    ) -> Result<Vec<ActionResult>, GatewayError> {
        let requests = self.by_id_requests(index, ids.into(), |id| {
            build_delete_request(index, id, options)
        })?;
        debug!(batch_size = requests.len(), "Deleting documents");
        self.dispatch(requests).await
    }

    /// Check which ids exist. Each result carries `exists` and the engine status (200 or 404).
    #[instrument(skip_all, fields(index = %index))]
    pub async fn exists(
        &self,
        index: &str,
        ids: impl Into<OneOrMany<String>>,
        options: Option<&OperationOptions>,
    ) -> Result<Vec<ActionResult>, GatewayError> {
        let requests = self.by_id_requests(index, ids.into(), |id| {
            build_exists_request(index, id, options)
        })?;
        debug!(batch_size = requests.len(), "Checking document existence");
        self.dispatch(requests).await
    }

    /// Apply the same partial update to every id.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index name
    /// * `ids` - A single id or a list of ids
    /// * `update` - Either a partial document merge or a script
    /// * `options` - Engine options forwarded as query parameters
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ActionResult>)` - One result per id; missing documents come back as
    ///   `not_found` with the engine's error payload
    /// * `Err(GatewayError)` - If validation fails or the engine could not be reached
    #[instrument(skip_all, fields(index = %index))]
    pub async fn update_by_id(
        &self,
        index: &str,
        ids: impl Into<OneOrMany<String>>,
        update: &UpdateSpec,
        options: Option<&OperationOptions>,
    ) -> Result<Vec<ActionResult>, GatewayError> {
        let requests = self.by_id_requests(index, ids.into(), |id| {
            build_update_request(index, id, update, options)
        })?;
        debug!(batch_size = requests.len(), "Updating documents");
        self.dispatch(requests).await
    }

    /// Delete every document matching `query` across one or more indices.
    ///
    /// A query matching nothing is a success with `deleted == 0`.
    #[instrument(skip_all)]
    pub async fn delete_by_query(
        &self,
        indices: impl Into<OneOrMany<String>>,
        query: &Value,
        options: Option<&OperationOptions>,
    ) -> Result<ActionResult, GatewayError> {
        let indices = indices.into().into_vec();
        if indices.is_empty() {
            return Err(GatewayError::validation("At least one index is required"));
        }
        for index in &indices {
            validate_index(index)?;
        }

        let request = build_delete_by_query_request(&indices, query, options);
        debug!(index = %request.index, "Deleting documents by query");
        let response = self.engine.send(&request).await?;
        Ok(normalize(&request, response))
    }

    /// Update every document in `index` matched by the update's query.
    ///
    /// A `QueryUpdate` without a query applies to the whole index.
    #[instrument(skip_all, fields(index = %index))]
    pub async fn update_by_query(
        &self,
        index: &str,
        update: &QueryUpdate,
        options: Option<&OperationOptions>,
    ) -> Result<ActionResult, GatewayError> {
        validate_index(index)?;

        let request = build_update_by_query_request(index, update, options);
        debug!("Updating documents by query");
        let response = self.engine.send(&request).await?;
        Ok(normalize(&request, response))
    }

    /// Run a search and return the hits as documents.
    ///
    /// Each document carries its content plus `_index`, `_id`, `_score` and any version
    /// metadata the engine returned. A non-200 response yields an empty list.
    #[instrument(skip_all, fields(index = %index))]
    pub async fn search(
        &self,
        index: &str,
        query: &Value,
        options: Option<&OperationOptions>,
    ) -> Result<Vec<Document>, GatewayError> {
        validate_index(index)?;

        let request = build_search_request(index, query, options);
        let response = self.engine.send(&request).await?;
        if response.status_code != 200 {
            warn!(
                status_code = response.status_code,
                error = %response.body,
                "Search returned no results"
            );
        }

        let hits = normalize_search_hits(&response);
        debug!(hits = hits.len(), "Search completed");
        Ok(hits)
    }

    /// Check whether the engine is reachable.
    pub async fn health_check(&self) -> Result<bool, GatewayError> {
        self.engine.health_check().await
    }

    /// Release the engine handle. The gateway cannot be used afterwards.
    pub async fn close(self) -> Result<(), GatewayError> {
        info!("Closing bulk document gateway");
        self.engine.close().await
    }
}
