//! Log output for the host app.

use tracing_subscriber::EnvFilter;

/// Install a formatted log subscriber filtered by `filter` (e.g. `"info"` or
/// `"clinic_finder_core=debug"`).
///
/// An unparsable filter falls back to `info`. Only the first call installs a
/// subscriber; later calls return `false` and change nothing.
pub fn init_logging(filter: &str) -> bool {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
