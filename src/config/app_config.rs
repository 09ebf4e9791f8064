use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::rating::RatingApiConfig;
use crate::infrastructure::services::SyncConfig;
use crate::infrastructure::storage::PostgresConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: PostgresConfig,
    pub rating_api: RatingApiConfig,
    pub sync: SyncConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            app_config.database.url = url;
        }

        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = from_toml("");

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.sync.concurrency, 100);
        assert_eq!(config.sync.table, "team_releases");
        assert_eq!(config.rating_api.retry.max_retries, 5);
    }

    #[test]
    fn test_partial_sections_override_defaults() {
        let config = from_toml(
            r#"
            [logging]
            format = "json"

            [sync]
            concurrency = 10
            schedule_interval_secs = 3600

            [rating_api]
            base_url = "http://localhost:9000"

            [rating_api.retry]
            max_retries = 1
            "#,
        );

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.sync.concurrency, 10);
        assert_eq!(config.sync.schedule_interval_secs, Some(3600));
        assert_eq!(config.sync.table, "team_releases");
        assert_eq!(config.rating_api.base_url, "http://localhost:9000");
        assert_eq!(config.rating_api.retry.max_retries, 1);
        assert_eq!(config.rating_api.retry.initial_delay_ms, 200);
    }
}
