//! Application error types.

use domain::DomainError;
use thiserror::Error;

/// Errors raised while starting or running the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable held a value that could not be used.
    #[error("Invalid configuration: {key}={value}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Tracing or the metrics recorder could not be installed.
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// A domain operation failed.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
