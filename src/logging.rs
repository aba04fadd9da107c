//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "HOLLOWCHECK_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber.
///
/// Reads `HOLLOWCHECK_LOG` for per-module levels, e.g.
/// `HOLLOWCHECK_LOG=hollowcheck::registry=debug`. Falls back to
/// `hollowcheck=warn` when unset or invalid. Logs go to stderr so JSON
/// output on stdout stays clean. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("hollowcheck=warn"));

        // A subscriber installed elsewhere (tests, embedding apps) wins.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .try_init();
    });
}
