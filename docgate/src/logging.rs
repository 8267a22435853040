//! Tracing subscriber setup.
//!
//! docgate only emits `tracing` events. Applications that do not install their own
//! subscriber can call [`init`] once at startup.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back to `filter`.
///
/// Returns `false` when a global subscriber is already set, in which case nothing changes.
pub fn init(filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

pub fn init_from_config(config: &LoggingConfig) -> bool {
    init(&config.filter)
}
