//! Logging configuration for mysqlcmd.
//!
//! Logs always go to stderr so that stdout carries nothing but results.

use tracing_subscriber::EnvFilter;

/// Initializes logging on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` applies to every
/// target.
pub fn init_stderr_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the default level for the `--debug` switch.
pub fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}
