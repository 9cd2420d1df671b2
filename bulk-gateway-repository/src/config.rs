//! Configuration types for the BulkDocumentGateway.

use std::time::Duration;

use crate::fan_out::DEFAULT_CONCURRENCY;

/// Engine endpoint used when none is configured.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:9200";

/// Batch size limit applied unless the caller opts out.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Configuration for the BulkDocumentGateway.
///
/// Controls the engine endpoint, how many per-item operations run at once and how
/// large a single batch may be.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Engine endpoint URL (e.g. "http://localhost:9200").
    pub url: String,

    /// Optional index-name prefix. Carried for callers; the gateway does not apply it.
    pub key_prefix: Option<String>,

    /// Maximum number of per-item operations in flight within one batch.
    pub concurrency: usize,

    /// Maximum number of items allowed in a single batch operation.
    ///
    /// Set to `None` to disable the limit (not recommended for production).
    /// Defaults to 1000 if not specified.
    pub max_batch_size: Option<usize>,

    /// Per-request timeout applied by the transport. `None` keeps the client default.
    pub request_timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
            key_prefix: None,
            concurrency: DEFAULT_CONCURRENCY,
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
            request_timeout: None,
        }
    }
}

impl GatewayConfig {
    /// Create a config targeting `url` with default limits.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the fan-out concurrency ceiling. Zero is treated as one at dispatch time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set a custom batch size limit.
    ///
    /// # Arguments
    ///
    /// * `max_batch_size` - Maximum number of items allowed in a single batch operation
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }

    /// Remove the batch size limit.
    ///
    /// # Warning
    ///
    /// Use with caution. Without a limit a single call can schedule an arbitrary
    /// number of engine requests.
    pub fn unlimited(mut self) -> Self {
        self.max_batch_size = None;
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(key_prefix.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
