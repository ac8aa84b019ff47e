//! Tracing setup
//!
//! The library only emits `tracing` events; the binary installs a subscriber
//! once at startup. `RUST_LOG` overrides the default `yaba=info` filter.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Default filter directive when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVE: &str = "yaba=info";

/// Installs the global tracing subscriber, writing to stderr
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // A subscriber may already be installed by an embedding application.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();

        tracing::debug!("tracing initialized");
    });
}
