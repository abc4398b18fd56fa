//! Log output setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a formatted `tracing` subscriber filtered by `directives`
/// (the `COLLAB_LOG` value, e.g. `"info"` or `"collabgate_session=debug"`).
///
/// Falls back to `info` if the directives don't parse. Calling it again
/// after a subscriber is installed does nothing.
pub fn init_tracing(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("invalid log filter {directives:?} ({e}), using \"info\"");
        EnvFilter::new("info")
    });

    // Err means a subscriber is already set (tests, embedding apps).
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init();
}
