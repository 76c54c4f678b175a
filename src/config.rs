//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::macros::{EngineOptions, TimestampStyle};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub processor: ProcessorConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query processing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Timezone used when a request names none
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    #[serde(default)]
    pub timestamp_style: TimestampStyle,

    /// Block queries whose time filter had to be dropped
    #[serde(default)]
    pub strict_epoch_units: bool,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            timestamp_style: TimestampStyle::default(),
            strict_epoch_units: false,
        }
    }
}

impl ProcessorConfig {
    /// Substitution engine options derived from this config
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            timestamp_style: self.timestamp_style,
            strict_epoch_units: self.strict_epoch_units,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
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
            dirs::config_dir().map(|p| p.join("timebound").join("config.toml")),
            Some(PathBuf::from("/etc/timebound/config.toml")),
            Some(PathBuf::from("./timebound.toml")),
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
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup
    ///
    /// Values that fail to parse are ignored with a warning.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Processor overrides
        if let Some(timezone) = lookup("TIMEBOUND_TIMEZONE") {
            self.processor.default_timezone = timezone;
        }
        if let Some(style) = lookup("TIMEBOUND_TIMESTAMP_STYLE") {
            match style.parse() {
                Ok(style) => self.processor.timestamp_style = style,
                Err(e) => tracing::warn!("Ignoring TIMEBOUND_TIMESTAMP_STYLE: {}", e),
            }
        }
        if let Some(strict) = lookup("TIMEBOUND_STRICT_EPOCH_UNITS") {
            match strict.to_lowercase().parse() {
                Ok(strict) => self.processor.strict_epoch_units = strict,
                Err(_) => tracing::warn!(
                    "Ignoring TIMEBOUND_STRICT_EPOCH_UNITS: expected true or false, got '{}'",
                    strict
                ),
            }
        }

        // API overrides
        if let Some(host) = lookup("TIMEBOUND_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("TIMEBOUND_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring TIMEBOUND_API_PORT: invalid port '{}'", port),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("TIMEBOUND_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TIMEBOUND_LOG_FORMAT") {
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
    r#"# Timebound Configuration
#
# Environment variables override these settings:
# - TIMEBOUND_TIMEZONE
# - TIMEBOUND_TIMESTAMP_STYLE
# - TIMEBOUND_STRICT_EPOCH_UNITS
# - TIMEBOUND_API_HOST
# - TIMEBOUND_API_PORT
# - TIMEBOUND_LOG_LEVEL
# - TIMEBOUND_LOG_FORMAT

[processor]
# Timezone for absolute times when a request names none
# (IANA name such as "Europe/Berlin", "UTC", or an offset such as "+05:30")
default_timezone = "UTC"

# Literal style for DATE/TIMESTAMP/DATETIME columns: plain, ansi or iso8601
timestamp_style = "plain"

# Block queries whose time filter was replaced by 1=1
strict_epoch_units = false

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Maximum request body size (bytes)
max_body_size = 1048576

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
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.processor.default_timezone, "UTC");
        assert_eq!(config.processor.timestamp_style, TimestampStyle::Plain);
        assert!(!config.processor.strict_epoch_units);
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.api.max_body_size, 1_048_576);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.processor, ProcessorConfig::default());
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[processor]\ndefault_timezone = \"Europe/Berlin\"\ntimestamp_style = \"ansi\"\n\n[api]\nport = 9000"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.processor.default_timezone, "Europe/Berlin");
        assert_eq!(config.processor.timestamp_style, TimestampStyle::Ansi);
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/timebound.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[processor]\ntimestamp_style = \"fancy\"").unwrap();
        let bad = Config::load(file.path());
        assert!(matches!(bad, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars = env(&[
            ("TIMEBOUND_TIMEZONE", "+05:30"),
            ("TIMEBOUND_TIMESTAMP_STYLE", "iso8601"),
            ("TIMEBOUND_STRICT_EPOCH_UNITS", "TRUE"),
            ("TIMEBOUND_API_PORT", "9100"),
            ("TIMEBOUND_LOG_FORMAT", "json"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.processor.default_timezone, "+05:30");
        assert_eq!(config.processor.timestamp_style, TimestampStyle::Iso8601);
        assert!(config.processor.strict_epoch_units);
        assert_eq!(config.api.port, 9100);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let vars = env(&[
            ("TIMEBOUND_TIMESTAMP_STYLE", "fancy"),
            ("TIMEBOUND_STRICT_EPOCH_UNITS", "maybe"),
            ("TIMEBOUND_API_PORT", "not-a-port"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.processor.timestamp_style, TimestampStyle::Plain);
        assert!(!config.processor.strict_epoch_units);
        assert_eq!(config.api.port, 8090);
    }

    #[test]
    fn test_engine_options() {
        let config = ProcessorConfig {
            timestamp_style: TimestampStyle::Ansi,
            strict_epoch_units: true,
            ..Default::default()
        };
        let options = config.engine_options();
        assert_eq!(options.timestamp_style, TimestampStyle::Ansi);
        assert!(options.strict_epoch_units);
    }
}
