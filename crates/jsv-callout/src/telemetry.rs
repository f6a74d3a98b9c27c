//! Tracing setup for hosts that do not install their own subscriber.
//!
//! `RUST_LOG` selects the filter (default `info`); `JSV_LOG_FORMAT=json`
//! switches to JSON lines.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "JSV_LOG_FORMAT";

/// Output format for [`init_tracing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Format named by `JSV_LOG_FORMAT`; anything but `json` is text.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(ENV_LOG_FORMAT) {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Failure installing the global subscriber.
#[derive(Error, Debug)]
#[error("tracing subscriber already installed: {0}")]
pub struct TelemetryError(String);

/// Install a global `tracing` subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| TelemetryError(e.to_string()))
}
