//! Configuration management for treecp
//!
//! Settings are layered the usual way: built-in defaults, then a YAML, TOML or
//! JSON file, then `TREECP__SECTION__KEY` environment variables. The result is
//! validated before it is handed to the engine.
//!
//! # Examples
//!
//! ```rust,no_run
//! use treecp_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("treecp.yaml")
//!     .add_env_prefix("TREECP")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Clobber: {}", config.copy.clobber);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use treecp_types::{BufferSize, ConcurrencyLimit};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for treecp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Copy behavior
    pub copy: CopySettings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Copy behavior settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopySettings {
    /// Overwrite existing destination files
    pub clobber: bool,
    /// Abort on the first fatal error instead of collecting all of them
    pub stop_on_error: bool,
    /// Copy what symlinks point to rather than the links themselves
    pub inflate_symlinks: bool,
    /// Maximum number of simultaneous file copies; unbounded when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<ConcurrencyLimit>,
    /// With `clobber` off, still overwrite files whose source is newer
    pub update_newer: bool,
    /// Replicate access and modification times onto copied files
    pub preserve_timestamps: bool,
    /// Chunk size of the default byte copy
    pub buffer_size: BufferSize,
    /// Glob patterns of entries to leave out
    pub exclude: Vec<String>,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            clobber: true,
            stop_on_error: false,
            inflate_symlinks: true,
            limit: None,
            update_newer: false,
            preserve_timestamps: false,
            buffer_size: BufferSize::default(),
            exclude: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
