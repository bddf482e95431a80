//! Log subscriber setup

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr so stdout carries
/// only command output.
///
/// Priority: RUST_LOG env var > config `log_level` > default (debug for
/// dev, info for release).
pub fn init(log_level: Option<&str>, json: bool) {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = log_level.unwrap_or(default_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
