//! Search engine trait definition.

use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::types::{EngineRequest, EngineResponse};

/// Abstracts the HTTP API of an OpenSearch/Elasticsearch-compatible engine.
///
/// Implementations are injected into `BulkDocumentGateway`. The gateway builds every
/// request itself, so an engine only has to execute one request and hand back the
/// status and decoded body.
///
/// # Error contract
///
/// A response with any status code, 4xx and 5xx included, is `Ok(EngineResponse)`.
/// `Err` is reserved for transport failures where no response was received at all
/// (connection refused, timeout, unreadable body).
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Execute a single request against the engine.
    ///
    /// # Arguments
    ///
    /// * `request` - The request descriptor built by the gateway
    ///
    /// # Returns
    ///
    /// * `Ok(EngineResponse)` - The engine answered, whatever the status
    /// * `Err(GatewayError)` - No response was received
    async fn send(&self, request: &EngineRequest) -> Result<EngineResponse, GatewayError>;

    /// Check whether the engine is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The engine answered the ping
    /// * `Ok(false)` - The engine answered with a non-success status
    /// * `Err(GatewayError)` - The engine could not be reached
    async fn health_check(&self) -> Result<bool, GatewayError>;

    /// Release the engine's resources. The default does nothing.
    async fn close(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}
