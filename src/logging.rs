//! Tracing setup shared by the binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` wins, otherwise the configured level
/// applies to this crate and `warn` to everything else.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level))
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("warn,telemetry_console={level},tower_http={level}"))
}

/// Install the global subscriber.
///
/// Calling this twice is harmless; the second call logs nothing and
/// keeps the first subscriber.
pub fn init(config: &LoggingConfig) {
    let filter = env_filter(config);

    let result = if config.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(level = %config.level, format = %config.format, "Logging initialized");
    }
}
