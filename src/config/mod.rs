//! Configuration management for regsearch.
//!
//! This module handles loading, parsing, and managing configuration from:
//! - Configuration files (TOML format)
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::export::ColumnPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Registry API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Export configuration
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Registry API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the registry API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Path of the bulk search endpoint, relative to the base URL
    #[serde(default = "default_search_path")]
    pub search_path: String,

    /// Session token for authenticated requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Anonymous token used when no session token is configured
    #[serde(default = "default_public_token")]
    pub public_token: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Which flattened paths become CSV columns
    #[serde(default = "default_column_policy")]
    pub column_policy: ColumnPolicyKind,

    /// Leaf field names admitted under the `leaf-allow-list` policy
    #[serde(default = "default_leaf_fields")]
    pub leaf_fields: Vec<String>,

    /// Drop empty arrays/objects while flattening instead of keeping
    /// present-but-empty markers
    #[serde(default)]
    pub exclude_empty_containers: bool,

    /// Directory exported files are written to (current directory if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Show a progress bar during export
    #[serde(default = "default_progress_bar")]
    pub progress_bar: bool,
}

/// Column policy options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnPolicyKind {
    /// Every leaf path becomes a column.
    AllLeaves,

    /// Only paths ending in one of the configured leaf field names.
    LeafAllowList,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a tracing level filter.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions
fn default_endpoint() -> String {
    "https://registry.example.org/api/v1/".to_string()
}

fn default_search_path() -> String {
    "records/search/".to_string()
}

fn default_public_token() -> String {
    "public".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_column_policy() -> ColumnPolicyKind {
    ColumnPolicyKind::LeafAllowList
}

fn default_leaf_fields() -> Vec<String> {
    ColumnPolicy::default_allow_list()
}

fn default_progress_bar() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            search_path: default_search_path(),
            auth_token: None,
            public_token: default_public_token(),
            timeout: default_timeout(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            column_policy: default_column_policy(),
            leaf_fields: default_leaf_fields(),
            exclude_empty_containers: false,
            output_dir: None,
            progress_bar: default_progress_bar(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl ExportConfig {
    /// The effective column policy.
    pub fn column_policy(&self) -> ColumnPolicy {
        match self.column_policy {
            ColumnPolicyKind::AllLeaves => ColumnPolicy::AllLeaves,
            ColumnPolicyKind::LeafAllowList => {
                ColumnPolicy::LeafAllowList(self.leaf_fields.clone())
            }
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicitly given path must exist; without one, the default path
    /// is used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(
                        ConfigError::FileNotFound(path.display().to_string()).into()
                    );
                }
                Self::load_from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Write this configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("regsearch").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.timeout, 30);
        assert_eq!(config.api.public_token, "public");
        assert_eq!(config.export.column_policy, ColumnPolicyKind::LeafAllowList);
        assert!(!config.export.exclude_empty_containers);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            endpoint = "https://registry.local/api/"
            auth_token = "s3cret"

            [export]
            column_policy = "all-leaves"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.endpoint, "https://registry.local/api/");
        assert_eq!(config.api.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.api.timeout, 30);
        assert_eq!(config.export.column_policy, ColumnPolicyKind::AllLeaves);
        assert!(config.export.progress_bar);
    }

    #[test]
    fn test_effective_column_policy() {
        let mut config = ExportConfig::default();
        assert_eq!(
            config.column_policy(),
            ColumnPolicy::LeafAllowList(ColumnPolicy::default_allow_list())
        );

        config.column_policy = ColumnPolicyKind::AllLeaves;
        assert_eq!(config.column_policy(), ColumnPolicy::AllLeaves);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.api.endpoint, config.api.endpoint);
        assert_eq!(parsed.export.leaf_fields, config.export.leaf_fields);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result: Result<Config> =
            toml::from_str("api = 3").map_err(|e| ConfigError::InvalidFormat(e.to_string()).into());
        assert!(result.is_err());
    }
}
