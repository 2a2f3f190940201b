//! Application configuration loaded from environment variables.

use crate::error::AppError;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,

    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Application configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `METRICS_ENABLED`: install the Prometheus recorder (default: `false`)
/// - `EVENT_PUBLISHER_ENABLED`: forward dispatched events over a channel (default: `true`)
/// - `EVENT_CHANNEL_CAPACITY`: bound of that channel (default: `1024`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
    pub event_publisher_enabled: bool,
    pub event_channel_capacity: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults for unset variables. Set but malformed values are errors.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse().map_err(|reason| AppError::Config {
                key: "LOG_FORMAT",
                value,
                reason,
            })?,
            None => defaults.log_format,
        };

        let event_channel_capacity = match lookup("EVENT_CHANNEL_CAPACITY") {
            Some(value) => {
                let parsed = value.trim().parse::<usize>();
                match parsed {
                    Ok(capacity) if capacity > 0 => capacity,
                    _ => {
                        return Err(AppError::Config {
                            key: "EVENT_CHANNEL_CAPACITY",
                            value,
                            reason: "expected a positive integer".to_string(),
                        });
                    }
                }
            }
            None => defaults.event_channel_capacity,
        };

        Ok(Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            metrics_enabled: parse_flag(&lookup, "METRICS_ENABLED", defaults.metrics_enabled)?,
            event_publisher_enabled: parse_flag(
                &lookup,
                "EVENT_PUBLISHER_ENABLED",
                defaults.event_publisher_enabled,
            )?,
            event_channel_capacity,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            event_publisher_enabled: true,
            event_channel_capacity: 1024,
        }
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}
