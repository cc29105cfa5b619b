//! # Console logging for binaries and demos.
//!
//! Installs a `tracing-subscriber` fmt layer filtered by `RUST_LOG`
//! (default `info`). The library itself only emits `tracing` events; embedders
//! with their own subscriber never need this module.
//!
//! ```text
//! RUST_LOG=mountbus=debug cargo run --example lifecycle --features logging
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// Returns `false` if a global subscriber was already set (nothing changes).
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
