//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::query::TranslateOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub translation: TranslateOptions,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query target configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_org")]
    pub org: String,
}

fn default_bucket() -> String {
    "my-bucket".to_string()
}

fn default_org() -> String {
    "my-org".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            org: default_org(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("fluxlinq").join("config.toml")),
            Some(PathBuf::from("./fluxlinq.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var("FLUXLINQ_BUCKET") {
            self.client.bucket = bucket;
        }
        if let Ok(org) = std::env::var("FLUXLINQ_ORG") {
            self.client.org = org;
        }

        if let Ok(level) = std::env::var("FLUXLINQ_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FLUXLINQ_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# fluxlinq Configuration
#
# Environment variables override these settings:
# - FLUXLINQ_BUCKET
# - FLUXLINQ_ORG
# - FLUXLINQ_LOG_LEVEL
# - FLUXLINQ_LOG_FORMAT

[client]
# Bucket queried by translated pipelines (bound to parameter p1)
bucket = "my-bucket"

# Organization passed to the query transport
org = "my-org"

[translation]
# Columns dropped ahead of the pivot stage; empty disables the drop stage
# drop_columns = ["_start", "_stop", "_measurement"]
drop_columns = []

# Translate Count() into stateCount/last/keep instead of rejecting it
count_result_function = false

# Optional upper bound of the range (seconds since the epoch)
# range_stop = 1605601215

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.client.bucket, "my-bucket");
        assert_eq!(config.client.org, "my-org");
        assert!(config.translation.drop_columns.is_empty());
        assert!(!config.translation.count_result_function);
        assert_eq!(config.translation.range_stop, None);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [translation]
            count_result_function = true
            drop_columns = ["_start"]
            "#,
        )
        .unwrap();

        assert!(config.translation.count_result_function);
        assert_eq!(config.translation.drop_columns, vec!["_start".to_string()]);
        assert_eq!(config.client.bucket, "my-bucket");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nbucket = \"sensors\"\norg = \"acme\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.client.bucket, "sensors");
        assert_eq!(config.client.org, "acme");
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/fluxlinq.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client\nbucket =").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
