//! Bootstrap utilities for joinpoint binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Default filter when `JOINPOINT_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Initialize tracing with the JOINPOINT_LOG environment variable.
///
/// Defaults to "info" level if JOINPOINT_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
