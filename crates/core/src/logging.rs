//! Logging infrastructure for the promptdoc service.
//!
//! This module initializes the tracing subscriber for structured logging.
//! All logs are emitted to stderr to keep stdout clean for data output.
//! Callers may attach one extra layer (the audit-database mirror) which
//! sees the same filtered event stream as the stderr writer.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::error::AppResult;

/// An optional extra layer attached beneath the filter and fmt layers.
pub type ExtraLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the tracing subscriber with stderr output.
///
/// This sets up structured logging with:
/// - Output to stderr (stdout is reserved for data)
/// - Environment-based filtering (RUST_LOG or provided level)
/// - An optional extra layer, e.g. the audit-log event mirror
///
/// # Arguments
/// * `log_level` - Optional log level override (e.g., "debug", "info")
/// * `no_color` - Disable colored output
/// * `extra` - Optional additional layer
pub fn init_logging(
    log_level: Option<&str>,
    no_color: bool,
    extra: Option<ExtraLayer>,
) -> AppResult<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    let env_filter = EnvFilter::try_new(filter_str)
        .map_err(|e| crate::error::AppError::Configuration(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(extra)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| {
            crate::error::AppError::Configuration(format!("Failed to init logging: {}", e))
        })?;

    Ok(())
}

/// Check if the terminal supports color output.
fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging() {
        // Note: Can only be called once per process
        let result = init_logging(None, false, None);
        assert!(result.is_ok() || result.is_err()); // May already be initialized
    }
}
