//! # Bulk Gateway Repository
//!
//! This crate provides the bulk document gateway: a thin layer over a search engine's
//! HTTP API that runs many single-document operations with bounded concurrency and
//! reports every outcome as a uniform `ActionResult`. It includes the engine interface,
//! a concrete implementation for OpenSearch, the request builder, the fan-out executor
//! and the response normalizer.

pub mod config;
pub mod errors;
pub mod fan_out;
pub mod interfaces;
pub mod normalize;
pub mod opensearch;
pub mod request;
pub mod service;
pub mod types;
pub mod utils;

pub use bulk_gateway_shared::{
    ActionOutcome, ActionResult, Document, OneOrMany, OperationOptions, QueryUpdate, Script,
    UpdateSpec,
};
pub use config::GatewayConfig;
pub use errors::GatewayError;
pub use fan_out::{fan_out, DEFAULT_CONCURRENCY};
pub use interfaces::SearchEngine;
pub use opensearch::OpenSearchEngine;
pub use service::BulkDocumentGateway;
pub use types::{EngineMethod, EngineRequest, EngineResponse, OperationKind};
