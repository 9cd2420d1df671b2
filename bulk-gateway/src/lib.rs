//! # Bulk Gateway
//!
//! Application wiring for the bulk document gateway.
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and engine connection
//! - [`telemetry`]: Tracing subscriber setup
//!
//! The gateway itself lives in `bulk_gateway_repository` and is re-exported here.

pub mod config;
pub mod telemetry;

pub use bulk_gateway_repository::{
    ActionOutcome, ActionResult, BulkDocumentGateway, Document, EngineMethod, EngineRequest,
    EngineResponse, GatewayConfig, GatewayError, OneOrMany, OpenSearchEngine, OperationKind,
    OperationOptions, QueryUpdate, Script, SearchEngine, UpdateSpec,
};
pub use config::{ConnectionMode, Dependencies, Settings};
pub use telemetry::init_tracing;

use thiserror::Error;

/// Errors that can occur while setting up the gateway.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Gateway error.
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),
}

impl BootstrapError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
