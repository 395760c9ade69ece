//! Logging setup for the `fep` binary.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global subscriber.
///
/// Level filtering comes from `RUST_LOG` (default `info`), e.g.
/// `RUST_LOG=fep_core=debug`. Logs go to stderr so that JSON written to
/// stdout stays clean.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Verbose subscriber for tests; safe to call more than once.
#[cfg(test)]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
