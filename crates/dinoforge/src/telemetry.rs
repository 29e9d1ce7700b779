//! Tracing initialization.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a global fmt subscriber filtered by `RUST_LOG`.
///
/// Defaults to `info`, e.g. `RUST_LOG=dinoforge_match=debug` for turn
/// level detail. A second call leaves the first subscriber in place.
pub fn init() {
    let fmt_layer = fmt::layer().with_target(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
