//! Logging setup.
//!
//! Helpers for wiring up structured logging with the `tracing` ecosystem.
//! Logs go to **stderr**: when the provider runs as a plugin subprocess,
//! stdout belongs to the host's handshake protocol.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: controls log levels (e.g. `info`, `debug`,
//!   `rdsdata_postgres_provider=debug`). Statement-level SQL logging is
//!   emitted at `debug`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the default logging subscriber.
///
/// Writes to stderr, respects `RUST_LOG`, defaults to `info`, compact
/// human-readable format.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this does not panic if a subscriber has already
/// been set, which matters in tests where several cases race to initialize.
pub fn try_init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so
    // initialization itself is not unit-tested here; we only check that the
    // filter syntax we document actually parses.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("debug").is_ok());
        assert!(EnvFilter::try_new("rdsdata_postgres_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,rdsdata_postgres_provider=debug").is_ok());
    }
}
