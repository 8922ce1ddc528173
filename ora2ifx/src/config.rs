//! Configuration handling for ora2ifx

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete ora2ifx configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub type_mapping: TypeMappingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

/// Source schema selection
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SourceConfig {
    /// Schema owner to convert
    pub owner: Option<String>,
    /// Path to a catalog snapshot (.json, .yaml or .yml)
    pub catalog: Option<String>,
}

/// Type mapping configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TypeMappingConfig {
    /// CSV file of (owner, table, column, target type) records, header skipped
    pub override_file: Option<String>,
    /// Inline overrides, applied after `override_file`
    pub custom: Option<Vec<CustomTypeMapping>>,
}

/// A forced target type for one column
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomTypeMapping {
    pub owner: String,
    pub table: String,
    pub column: String,
    pub target_type: String,
}

/// Extent sizing for `create table` storage clauses, in KB
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Stated extents at or below this size are replaced
    #[serde(default = "default_min_extent_kb")]
    pub min_extent_kb: u64,
    /// Replacement extent size
    #[serde(default = "default_extent_kb")]
    pub default_extent_kb: u64,
}

fn default_min_extent_kb() -> u64 {
    16
}

fn default_extent_kb() -> u64 {
    64
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            min_extent_kb: default_min_extent_kb(),
            default_extent_kb: default_extent_kb(),
        }
    }
}

impl StorageConfig {
    /// Apply the minimum-floor rule to a stated extent size
    pub fn extent_size(&self, stated_kb: Option<u64>) -> u64 {
        match stated_kb {
            Some(kb) if kb > self.min_extent_kb => kb,
            _ => self.default_extent_kb,
        }
    }
}

/// Output destination
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OutputConfig {
    /// DDL file; stdout when absent
    pub file: Option<String>,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_format() -> String {
    "text".to_string()
}
