//! OpenSearch engine implementation.

use async_trait::async_trait;
use opensearch::{
    http::{
        headers::HeaderMap,
        request::JsonBody,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::interfaces::SearchEngine;
use crate::types::{EngineMethod, EngineRequest, EngineResponse};

/// OpenSearch engine implementation.
///
/// Executes prebuilt gateway requests through the client's generic `send`, so every
/// endpoint the gateway needs goes through one code path.
///
/// # Example
///
/// ```ignore
/// use bulk_gateway_repository::{GatewayConfig, OpenSearchEngine};
///
/// let engine = OpenSearchEngine::new(&GatewayConfig::new("http://localhost:9200"))?;
/// assert!(engine.health_check().await?);
/// ```
pub struct OpenSearchEngine {
    client: OpenSearch,
}

impl OpenSearchEngine {
    /// Create a new OpenSearch engine for the configured URL.
    ///
    /// No request is sent; use `health_check` to verify the endpoint is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchEngine)` - A new engine instance
    /// * `Err(GatewayError::ConnectionError)` - If the URL is invalid or the transport
    ///   cannot be built
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| GatewayError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| GatewayError::connection(e.to_string()))?;

        info!(
            url = %config.url,
            timeout_ms = config.request_timeout.map(|t| t.as_millis() as u64),
            "Created OpenSearch engine"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    fn method(method: EngineMethod) -> Method {
        match method {
            EngineMethod::Get => Method::Get,
            EngineMethod::Head => Method::Head,
            EngineMethod::Post => Method::Post,
            EngineMethod::Put => Method::Put,
            EngineMethod::Delete => Method::Delete,
        }
    }
}

/// Decode a response body. Empty bodies become `Null`; non-JSON text is kept as a string.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl SearchEngine for OpenSearchEngine {
    async fn send(&self, request: &EngineRequest) -> Result<EngineResponse, GatewayError> {
        debug!(
            method = ?request.method,
            path = %request.path,
            kind = ?request.kind,
            "Sending engine request"
        );

        let query = (!request.query.is_empty()).then_some(&request.query);
        let body = request.body.clone().map(JsonBody::new);

        let response = self
            .client
            .send(
                Self::method(request.method),
                &request.path,
                HeaderMap::new(),
                query,
                body,
                None,
            )
            .await
            .map_err(|e| {
                error!(error = %e, path = %request.path, "Engine request failed");
                GatewayError::from(e)
            })?;

        let status_code = response.status_code().as_u16();
        if request.method == EngineMethod::Head {
            return Ok(EngineResponse::new(status_code, Value::Null));
        }

        let text = response.text().await.map_err(|e| {
            error!(error = %e, path = %request.path, "Failed to read engine response");
            GatewayError::parse(e.to_string())
        })?;

        debug!(status_code, path = %request.path, "Engine responded");

        Ok(EngineResponse::new(status_code, decode_body(&text)))
    }

    async fn health_check(&self) -> Result<bool, GatewayError> {
        let response = self.client.ping().send().await.map_err(|e| {
            error!(error = %e, "Engine ping failed");
            GatewayError::connection(e.to_string())
        })?;
        Ok(response.status_code().is_success())
    }

    async fn close(&self) -> Result<(), GatewayError> {
        info!("Closing OpenSearch engine");
        Ok(())
    }
}
