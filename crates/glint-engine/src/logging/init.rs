use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "glint_engine=debug,glint_demo=info"). When it is `None`, `RUST_LOG` is
/// consulted, then `default_level` applies to everything.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterSource {
    Config(String),
    Env(String),
    Default(LevelFilter),
}

fn resolve_filter(config: &LoggingConfig, env: Option<String>) -> FilterSource {
    match (&config.env_filter, env) {
        (Some(filter), _) => FilterSource::Config(filter.clone()),
        (None, Some(filter)) if !filter.trim().is_empty() => FilterSource::Env(filter),
        _ => FilterSource::Default(config.default_level),
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; later calls are ignored. If another logger was installed
/// first, that one stays and a debug message says so.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match resolve_filter(&config, std::env::var("RUST_LOG").ok()) {
            FilterSource::Config(filter) | FilterSource::Env(filter) => {
                builder.parse_filters(&filter);
            }
            FilterSource::Default(level) => {
                builder.filter_level(level);
            }
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            log::debug!("logger already installed; keeping it");
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_filter_wins_over_env() {
        let config = LoggingConfig {
            env_filter: Some("glint_engine=trace".to_string()),
            ..LoggingConfig::default()
        };
        assert_eq!(
            resolve_filter(&config, Some("warn".to_string())),
            FilterSource::Config("glint_engine=trace".to_string())
        );
    }

    #[test]
    fn env_then_default_level() {
        let config = LoggingConfig::default();
        assert_eq!(resolve_filter(&config, Some("debug".to_string())), FilterSource::Env("debug".to_string()));
        assert_eq!(resolve_filter(&config, Some("  ".to_string())), FilterSource::Default(LevelFilter::Info));
        assert_eq!(resolve_filter(&config, None), FilterSource::Default(LevelFilter::Info));
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
