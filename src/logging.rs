// ==========================================
// Logging setup
// ==========================================
// tracing + tracing-subscriber
// Level is taken from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// `json` switches the formatter to one JSON object per line
pub const ENV_LOG_FORMAT: &str = "POULTRY_METRICS_LOG_FORMAT";

/// Initialize logging
///
/// # Environment
/// - RUST_LOG: filter directive (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=poultry_metrics=trace
/// - POULTRY_METRICS_LOG_FORMAT: `json` for machine-readable output
///
/// # Example
/// ```no_run
/// use poultry_metrics::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Initialize logging for tests
///
/// Debug level, captured by the test harness. Safe to call repeatedly.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
