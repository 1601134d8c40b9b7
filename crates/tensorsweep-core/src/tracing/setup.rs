//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TENSORSWEEP_LOG";

/// Filter used when `TENSORSWEEP_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "tensorsweep=info";

/// Initialize the tracing/logging system from `TENSORSWEEP_LOG`.
///
/// Format: `TENSORSWEEP_LOG=tensorsweep_pipeline=debug,tensorsweep_storage=warn`
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    init_tracing_with(None);
}

/// Like [`init_tracing`], with an explicit filter taking precedence over the
/// environment (used by the CLI `--log-level` flag).
pub fn init_tracing_with(filter: Option<&str>) {
    INIT.call_once(|| {
        let filter = filter
            .and_then(|f| EnvFilter::try_new(f).ok())
            .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    });
}
