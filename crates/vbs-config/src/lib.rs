//! VBScript runtime configuration
//!
//! Provides the per-request settings consumed by `vbs-runtime`:
//! - Culture (component order used when parsing and printing dates)
//! - Limits (string length ceiling)
//! - Error trapping (whether trapped errors are logged)
//!
//! # Configuration Hierarchy
//!
//! Settings are resolved in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (`vbs.toml`, found by walking up from a directory)
//! 3. Environment variables (`VBS_*`)
//!
//! # Example
//!
//! ```no_run
//! use vbs_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("{:?}", config.date_order());
//! ```

pub mod loader;
pub mod runtime;

use std::path::PathBuf;
use thiserror::Error;

/// Longest string a runtime will ever build, in UTF-16 code units.
pub const MAX_STRING_LENGTH: usize = (i32::MAX as usize / 2) - 1;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "vbs.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::ConfigLoader;
pub use runtime::{CultureConfig, DateOrder, LimitsConfig, RuntimeConfig, TrappingConfig};
