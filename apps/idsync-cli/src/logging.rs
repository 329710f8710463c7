//! Log subscriber setup.
//!
//! Logs go to stderr so command output on stdout can be piped. `RUST_LOG`
//! takes precedence over the level passed in.

use tracing_subscriber::{fmt, EnvFilter};

use idsync_core::{SyncError, SyncResult};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(format: &str) -> SyncResult<Self> {
        match format.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(SyncError::Config(format!(
                "Unknown log format '{other}' (expected 'text' or 'json')"
            ))),
        }
    }
}

/// Build the filter from `RUST_LOG`, falling back to `level`.
pub fn build_filter(level: &str) -> SyncResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| SyncError::Config(format!("Invalid log level '{level}': {e}")))
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(level: &str, format: &str) -> SyncResult<()> {
    let format = LogFormat::parse(format)?;
    let builder = fmt()
        .with_env_filter(build_filter(level)?)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    result.map_err(|e| SyncError::Config(format!("Failed to initialize logging: {e}")))?;
    tracing::debug!(level = %level, ?format, "Logging initialized");
    Ok(())
}
