//! Dependency initialization and wiring for the bulk document gateway.

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::BootstrapError;
use bulk_gateway_repository::config::DEFAULT_ENGINE_URL;
use bulk_gateway_repository::{BulkDocumentGateway, GatewayConfig, OpenSearchEngine, SearchEngine};

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if the engine is unreachable.
    FailFast,
    /// Retry the health check at a fixed interval until the engine answers.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid ENGINE_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }
}

/// Everything needed to build and connect a gateway.
#[derive(Debug, Clone)]
pub struct Settings {
    pub gateway: GatewayConfig,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    /// Upper bound on health-check attempts in retry mode. `None` retries forever.
    pub max_connect_attempts: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            connection_mode: ConnectionMode::Retry,
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
            max_connect_attempts: None,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, BootstrapError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            BootstrapError::config(format!("{} has an invalid value: '{}'", name, raw))
        }),
    }
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ENGINE_URL`: Engine endpoint URL (default: http://localhost:9200)
    /// - `ENGINE_KEY_PREFIX`: Optional index-name prefix carried in the config
    /// - `GATEWAY_CONCURRENCY`: In-flight operations per batch (default: 5)
    /// - `GATEWAY_MAX_BATCH_SIZE`: Batch size limit, `0` disables it (default: 1000)
    /// - `ENGINE_REQUEST_TIMEOUT_SECS`: Per-request transport timeout (default: client default)
    /// - `ENGINE_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `ENGINE_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `ENGINE_MAX_CONNECT_ATTEMPTS`: Optional bound on connection attempts in retry mode
    pub fn from_env() -> Result<Self, BootstrapError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Settings with defaults applied for unset variables
    /// * `Err(BootstrapError::ConfigError)` - If a numeric variable does not parse
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BootstrapError> {
        let url = lookup("ENGINE_URL").unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string());
        let mut gateway = GatewayConfig::new(url);

        if let Some(prefix) = lookup("ENGINE_KEY_PREFIX").filter(|p| !p.is_empty()) {
            gateway = gateway.with_key_prefix(prefix);
        }
        if let Some(concurrency) = parse_var::<usize>(&lookup, "GATEWAY_CONCURRENCY")? {
            gateway = gateway.with_concurrency(concurrency);
        }
        match parse_var::<usize>(&lookup, "GATEWAY_MAX_BATCH_SIZE")? {
            Some(0) => gateway = gateway.unlimited(),
            Some(max) => gateway = gateway.with_max_batch_size(max),
            None => {}
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "ENGINE_REQUEST_TIMEOUT_SECS")? {
            gateway = gateway.with_request_timeout(Duration::from_secs(secs));
        }

        let connection_mode = ConnectionMode::parse(lookup("ENGINE_CONNECTION_MODE").as_deref());
        let retry_interval = parse_var::<u64>(&lookup, "ENGINE_RETRY_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);
        let max_connect_attempts = parse_var::<u32>(&lookup, "ENGINE_MAX_CONNECT_ATTEMPTS")?;

        Ok(Self {
            gateway,
            connection_mode,
            retry_interval: Duration::from_secs(retry_interval),
            max_connect_attempts,
        })
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The connected gateway, ready to use.
    pub gateway: BulkDocumentGateway,
}

impl Dependencies {
    /// Initialize all dependencies from `.env` and environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(BootstrapError)` - If configuration is invalid or the engine is unreachable
    ///   (immediately in fail-fast mode, after the attempt bound in retry mode)
    pub async fn new() -> Result<Self, BootstrapError> {
        dotenv().ok();
        let settings = Settings::from_env()?;
        Self::connect(settings).await
    }

    /// Build an OpenSearch-backed gateway from `settings` and wait until the engine answers.
    pub async fn connect(settings: Settings) -> Result<Self, BootstrapError> {
        info!(
            engine_url = %settings.gateway.url,
            concurrency = settings.gateway.concurrency,
            max_batch_size = ?settings.gateway.max_batch_size,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let engine = OpenSearchEngine::new(&settings.gateway).map_err(|e| {
            BootstrapError::config(format!("Failed to create OpenSearch engine: {}", e))
        })?;

        Self::with_engine(Arc::new(engine), settings).await
    }

    /// Wrap an existing engine in a gateway once its health check passes.
    pub async fn with_engine(
        engine: Arc<dyn SearchEngine>,
        settings: Settings,
    ) -> Result<Self, BootstrapError> {
        Self::wait_for_engine(engine.as_ref(), &settings).await?;
        info!("Engine connection established");

        Ok(Self {
            gateway: BulkDocumentGateway::with_config(engine, settings.gateway),
        })
    }

    /// Health-check the engine with retry logic based on connection mode.
    async fn wait_for_engine(
        engine: &dyn SearchEngine,
        settings: &Settings,
    ) -> Result<(), BootstrapError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let failure = match engine.health_check().await {
                Ok(true) => return Ok(()),
                Ok(false) => "engine health check returned a non-success status".to_string(),
                Err(e) => e.to_string(),
            };

            let exhausted = settings
                .max_connect_attempts
                .is_some_and(|max| attempts >= max);
            if settings.connection_mode == ConnectionMode::FailFast || exhausted {
                return Err(BootstrapError::config(format!(
                    "Failed to connect to engine after {} attempt(s): {}",
                    attempts, failure
                )));
            }

            warn!(
                engine_url = %settings.gateway.url,
                error = %failure,
                attempt = attempts,
                retry_interval_secs = settings.retry_interval.as_secs(),
                "Failed to connect to engine, retrying..."
            );
            sleep(settings.retry_interval).await;
        }
    }
}
