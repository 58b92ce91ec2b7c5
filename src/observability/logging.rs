//! Structured logging.
//!
//! Uses `tracing` with an `EnvFilter`, so `RUST_LOG` overrides the default
//! directives.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Directives used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "web_scaffold=debug,tower_http=debug";

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(default_directives: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
