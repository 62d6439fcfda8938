//! API configuration

use serde::Deserialize;

use core_kernel::CoreError;
use domain_risk::services::DEFAULT_COMPONENT_LIMIT;
use infra_db::DEFAULT_CACHE_CAPACITY;

/// Largest `limit` a listing endpoint accepts
pub const MAX_LIMIT: usize = 1000;

/// Shape of the log lines written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Log line format
    pub log_format: LogFormat,
    /// Memoize portfolio fetches by segment filter
    pub cache_enabled: bool,
    /// Most distinct segment filters the fetch cache keeps
    pub cache_capacity: usize,
    /// Rows returned by the component flags listing when no `limit` is given
    pub default_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/risk_analytics".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cache_enabled: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            default_limit: DEFAULT_COMPONENT_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Checks the values that would otherwise fail later at startup
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.port == 0 {
            return Err(CoreError::Configuration("port must be non-zero".to_string()));
        }
        if self.database_url.trim().is_empty() {
            return Err(CoreError::Configuration("database_url is empty".to_string()));
        }
        if self.default_limit == 0 || self.default_limit > MAX_LIMIT {
            return Err(CoreError::Configuration(format!(
                "default_limit must be within 1..={}, got {}",
                MAX_LIMIT, self.default_limit
            )));
        }
        if self.cache_enabled && self.cache_capacity == 0 {
            return Err(CoreError::Configuration(
                "cache_capacity must be non-zero when the cache is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_rejects_zero_limit() {
        let config = ApiConfig {
            default_limit: 0,
            ..ApiConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_rejects_empty_database_url() {
        let config = ApiConfig {
            database_url: "  ".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_cache_capacity() {
        let config = ApiConfig {
            cache_capacity: 0,
            ..ApiConfig::default()
        };
        assert!(config.validate().is_err());

        let uncached = ApiConfig {
            cache_enabled: false,
            ..config
        };
        assert!(uncached.validate().is_ok());
    }

    #[test]
    fn test_log_format_parses_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(ApiConfig::default().log_format, LogFormat::Text);
        assert!(serde_json::from_str::<LogFormat>("\"xml\"").is_err());
    }
}
