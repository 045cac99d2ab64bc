//! Logging bootstrap

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::LoggingConfig;

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = env_filter(config);
    let registry = Registry::default().with(filter);
    if config.json {
        registry.with(fmt::layer().json()).try_init().is_ok()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn test_bad_level_falls_back() {
        let config = LoggingConfig {
            level: "[[not a directive".to_string(),
            json: false,
        };
        let _ = env_filter(&config);
    }
}
