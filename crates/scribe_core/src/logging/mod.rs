//! Logging infrastructure.
//!
//! The core logs through the `tracing` ecosystem and never prints
//! directly; presentation layers decide what reaches the user.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects the RUST_LOG environment variable, falling back to the
/// provided default directive (e.g. `"info"`). Call once at startup.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
