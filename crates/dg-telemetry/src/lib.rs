//! # DON Gateway Telemetry
//!
//! Logging and metrics shared by every gateway subsystem.
//!
//! ## Components
//!
//! - **Logging**: `tracing` subscriber with an `EnvFilter`, human or JSON output
//! - **Metrics**: one Prometheus registry holding every collector the
//!   subsystems write to, exposed in text format by `encode_metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dg_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DG_SERVICE_NAME` | `don-gateway` | Service name attached to log lines |
//! | `DG_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` is also honoured) |
//! | `DG_JSON_LOGS` | `false` | Emit JSON log lines |
//! | `DG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, AGGREGATION_GROUPS,
    AGGREGATION_OBSERVATIONS_EXPIRED, REGISTRY_LISTENER_FAILURES, REGISTRY_REMOTE_SYNC_FAILURES,
    REGISTRY_STATES_PERSISTED, REGISTRY_SYNC_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register all metrics.
///
/// The returned guard keeps the metrics registry alive; hold it for the
/// lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
