//! Tracing setup for binaries and embedding hosts.
//!
//! The library only emits `tracing` events; installing a subscriber is
//! left to whoever loads the rule.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset, empty or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "outofbound=info";

/// Builds the event filter from a `RUST_LOG`-style string.
///
/// A usable `rust_log` is taken as is, so it can raise or lower this
/// crate's level. Otherwise [`DEFAULT_DIRECTIVE`] applies.
#[must_use]
pub fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs a stderr fmt subscriber filtered by `RUST_LOG`, falling back
/// to [`DEFAULT_DIRECTIVE`]. Returns false if a global subscriber was
/// already set.
pub fn init_tracing() -> bool {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
