//! Structured logging for the command-line driver
//!
//! Logs go to stderr so that stdout carries only the rewritten document.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted when no level is given explicitly
pub const LOG_ENV: &str = "TEXYLL_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// Pick the filter: explicit level first, then `TEXYLL_LOG`, then `warn`
pub fn filter_from(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL)),
    }
}

/// Initialise the global subscriber
///
/// If a global subscriber is already set the call is ignored, so tests and
/// repeated initialisation are harmless.
pub fn init_logging(level: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_from(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
