//! Log output for the command-line binary
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. `RUST_LOG` takes precedence over the level chosen on the
//! command line.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the filter used when `RUST_LOG` is not set
pub fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!("warn,diffbot={}", level.as_str().to_lowercase()))
}

/// Installs a compact stderr subscriber
///
/// Calling this twice is harmless; the second subscriber is ignored.
pub fn init_tracing(level: Level) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
