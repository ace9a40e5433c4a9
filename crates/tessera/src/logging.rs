//! Logger setup.
//!
//! Everything in the crate logs through the `log` facade. [`init_logger`]
//! installs `env_logger` as the backend once per process. Filters follow
//! `env_logger` syntax, e.g. `"info"` or `"tessera=debug,wgpu=warn"`.
//!
//! `RUST_LOG`, when set, wins over [`LoggingConfig::filter`], and both fall
//! back to `info`.

use std::sync::Once;

use serde::{Deserialize, Serialize};

/// Logger settings, usually read from the `logging` section of an
/// [`AppConfig`](crate::config::AppConfig).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

static INIT: Once = Once::new();

/// Install the global logger. Later calls are ignored.
pub fn init_logger(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(std::env::var("RUST_LOG").ok(), config.filter.as_deref());

        let mut builder = env_logger::Builder::new();
        match filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
            }
        }

        // Another logger (a test harness, an embedding app) may already be set.
        if builder.try_init().is_err() {
            log::warn!("a logger is already installed; keeping it");
            return;
        }
        log::debug!("logging initialized");
    });
}

fn resolve_filter(env: Option<String>, configured: Option<&str>) -> Option<String> {
    env.filter(|f| !f.trim().is_empty())
        .or_else(|| configured.map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_filter_wins() {
        assert_eq!(
            resolve_filter(Some("warn".into()), Some("debug")),
            Some("warn".to_owned())
        );
    }

    #[test]
    fn configured_filter_used_without_env() {
        assert_eq!(resolve_filter(None, Some("debug")), Some("debug".to_owned()));
        assert_eq!(resolve_filter(Some("  ".into()), Some("debug")), Some("debug".to_owned()));
    }

    #[test]
    fn no_filter_means_default_level() {
        assert_eq!(resolve_filter(None, None), None);
    }

    #[test]
    fn repeated_init_is_harmless() {
        let config = LoggingConfig::default();
        init_logger(&config);
        init_logger(&config);
    }
}
