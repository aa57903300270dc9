use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is not provided.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Install the JSON log subscriber used by every function binary.
///
/// One JSON object per line on stdout, which the platform forwards to the
/// function's log group unchanged.
pub fn init_logging() -> Result<(), String> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    fmt::fmt()
        .json()
        .flatten_event(true)
        .with_env_filter(env_filter)
        .with_target(false)
        .with_current_span(false)
        .try_init()
        .map_err(|error| format!("failed to install tracing subscriber: {error}"))
}
