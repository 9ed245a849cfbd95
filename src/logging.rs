//! Tracing setup
//!
//! Library code only emits `tracing` events; the binary installs the
//! subscriber once at startup.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a `tracing` filter directive
pub const LOG_ENV: &str = "POCKETLEDGER_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber, writing to stderr
///
/// `POCKETLEDGER_LOG` wins over `default_filter`; a malformed directive falls
/// back to `pocketledger=warn`.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("pocketledger=warn"));

        // A subscriber installed by a test harness is fine to keep
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
