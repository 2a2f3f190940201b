//! Tracing subscriber and metrics recorder setup.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogFormat};
use crate::error::AppError;

/// Installs the global tracing subscriber.
///
/// Fails if the filter directive does not parse or a subscriber is already
/// installed.
pub fn init_tracing(config: &Config) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| AppError::Telemetry(format!("invalid RUST_LOG directive: {e}")))?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    result.map_err(|e| AppError::Telemetry(e.to_string()))
}

/// Installs the global Prometheus recorder and returns a handle for rendering.
pub fn install_metrics_recorder() -> Result<PrometheusHandle, AppError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Telemetry(format!("failed to install Prometheus recorder: {e}")))
}
