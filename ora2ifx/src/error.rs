//! Error types for ora2ifx

use thiserror::Error;

/// Result type for ora2ifx operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ora2ifx
///
/// Unresolvable column types and partition layouts are not errors; they are
/// emitted as placeholder tokens and listed in the generation report.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Catalog access failed for one object (table, index or schema object list)
    #[error("Catalog error for {object}: {message}")]
    CatalogError { object: String, message: String },

    #[error("Type override error: {0}")]
    OverrideError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Create a catalog error for the named object
    pub fn catalog(object: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CatalogError {
            object: object.into(),
            message: message.into(),
        }
    }
}

/// Convert Serde JSON errors to ora2ifx errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to ora2ifx errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Error::OverrideError(error.to_string())
    }
}
