//! Errors raised while loading, validating or saving configuration

use std::path::PathBuf;
use thiserror::Error;
use treecp_types::Error as TreecpError;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file could not be read or written
    #[error("I/O error on config file '{}': {source}", .path.display())]
    Io {
        /// Path to the configuration file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Merging defaults, files and environment failed, or the merged result
    /// did not deserialize (this includes out-of-range `limit`/`buffer_size`)
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// `logging.level` names no known level
    #[error("Log level '{level}' is not one of: trace, debug, info, warn, error")]
    InvalidLogLevel {
        /// Level as written in the configuration
        level: String,
    },

    /// An entry of `copy.exclude` is not a valid glob
    #[error("Invalid pattern '{pattern}' in copy.exclude: {source}")]
    InvalidExclude {
        /// Offending pattern
        pattern: String,
        /// Parse error from globset
        source: globset::Error,
    },

    /// The configuration could not be written in the requested format
    #[error("Failed to serialize configuration as {format}: {message}")]
    Serialize {
        /// Target format name
        format: &'static str,
        /// Serializer message
        message: String,
    },
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialize("YAML", error)
    }
}

impl From<ConfigError> for TreecpError {
    fn from(error: ConfigError) -> Self {
        TreecpError::config(error.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a serialization error for `format`
    pub fn serialize(format: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Serialize {
            format,
            message: error.to_string(),
        }
    }
}
