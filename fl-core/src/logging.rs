//! SDK diagnostics via the `tracing` ecosystem.
//!
//! Everything the SDK logs goes out under the `faultline` target, and the
//! SDK never installs a subscriber of its own accord: a host application
//! that already has one sees the diagnostics there. The helper below is
//! for hosts without a subscriber, and for test binaries.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a compact stderr subscriber for SDK diagnostics.
///
/// `filter` takes env-filter syntax, so both plain levels ("debug") and
/// per-target directives ("faultline=debug") work. An unparseable filter
/// falls back to SDK warnings only. Repeat calls are no-ops.
pub fn init_console_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new("faultline=warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}
