//! Configuration management for parrotweb
//!
//! This module handles loading, validation, and management of
//! parrotweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./public")
}

/// Remote API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the Parrot Wings API (no trailing slash)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File holding the durable key-value store with the bearer token
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/session.json")
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings for the transactions table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Rows shown per page on first load
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,
    /// Choices offered by the page size selector
    #[serde(default = "default_rows_per_page_options")]
    pub rows_per_page_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            rows_per_page: default_rows_per_page(),
            rows_per_page_options: default_rows_per_page_options(),
        }
    }
}

fn default_rows_per_page() -> usize {
    5
}

fn default_rows_per_page_options() -> Vec<usize> {
    vec![5, 10, 25]
}

/// Amount display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Suffix appended to every amount
    #[serde(default = "default_currency_suffix")]
    pub suffix: String,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            suffix: default_currency_suffix(),
            thousands_separator: default_thousands_sep(),
        }
    }
}

fn default_currency_suffix() -> String {
    "PW".to_string()
}

fn default_thousands_sep() -> String {
    String::new()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote API settings
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded configuration from {}", path.to_string_lossy());
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if !(self.remote.base_url.starts_with("http://") || self.remote.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "remote.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.timeout_secs".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }

        if self.pagination.rows_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.rows_per_page".to_string(),
                reason: "Rows per page must be greater than 0".to_string(),
            });
        }

        if self.pagination.rows_per_page_options.iter().any(|n| *n == 0) {
            return Err(ConfigError::InvalidValue {
                field: "pagination.rows_per_page_options".to_string(),
                reason: "Page size options must be greater than 0".to_string(),
            });
        }

        if !self.pagination.rows_per_page_options.contains(&self.pagination.rows_per_page) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "pagination.rows_per_page ({}) is not one of rows_per_page_options",
                    self.pagination.rows_per_page
                ),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Remote base URL without a trailing slash
    pub fn api_base_url(&self) -> &str {
        self.remote.base_url.trim_end_matches('/')
    }

    /// Socket address string the server binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pagination.rows_per_page, 5);
        assert_eq!(config.pagination.rows_per_page_options, vec![5, 10, 25]);
        assert_eq!(config.currency.suffix, "PW");
    }

    #[test]
    fn test_generated_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.remote.base_url, "http://localhost:3001");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml("remote:\n  base_url: https://pw.example.com/\n").unwrap();
        assert_eq!(config.api_base_url(), "https://pw.example.com");
        assert_eq!(config.remote.timeout_secs, 15);
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Config::from_yaml("remote:\n  base_url: localhost:3001\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "remote.base_url"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rows_per_page_must_be_an_option() {
        let yaml = "pagination:\n  rows_per_page: 7\n  rows_per_page_options: [5, 10]\n";
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(Config::from_yaml("server: [1, 2"), Err(ConfigError::InvalidYaml)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/nonexistent/parrotweb.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
