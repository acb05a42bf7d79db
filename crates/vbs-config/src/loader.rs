//! Configuration Loader
//!
//! Handles locating vbs.toml and applying environment overrides.

use crate::runtime::{DateOrder, RuntimeConfig};
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding `culture.date_order`
pub const ENV_DATE_ORDER: &str = "VBS_DATE_ORDER";
/// Environment variable overriding `limits.max_string_length`
pub const ENV_MAX_STRING_LENGTH: &str = "VBS_MAX_STRING_LENGTH";
/// Environment variable overriding `trapping.log_trapped_errors`
pub const ENV_LOG_TRAPPED_ERRORS: &str = "VBS_LOG_TRAPPED_ERRORS";

/// Configuration loader
///
/// Loads configuration with the following precedence:
/// 1. Defaults - lowest priority
/// 2. Project config (vbs.toml) - overrides defaults
/// 3. Environment variables (VBS_*) - overrides project
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigLoader {
    /// Skip environment overrides (used by embedders that own their env)
    ignore_env: bool,
}

/// Loaded configuration together with where it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Effective runtime configuration
    pub runtime: RuntimeConfig,

    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Create a loader that does not consult `VBS_*` variables
    pub fn without_env() -> Self {
        Self { ignore_env: true }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find vbs.toml. When none exists the
    /// defaults are used.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<LoadedConfig> {
        let (source, runtime) = match find_config_file(start_dir) {
            Some(path) => {
                let config = RuntimeConfig::load_from_file(&path)?;
                (Some(path), config)
            }
            None => (None, RuntimeConfig::default()),
        };

        let runtime = self.apply_env_overrides(runtime)?;
        tracing::debug!(source = ?source, "loaded runtime configuration");
        Ok(LoadedConfig { runtime, source })
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<LoadedConfig> {
        let runtime = RuntimeConfig::load_from_file(config_path)?;
        let runtime = self.apply_env_overrides(runtime)?;
        tracing::debug!(source = %config_path.display(), "loaded runtime configuration");
        Ok(LoadedConfig {
            runtime,
            source: Some(config_path.to_path_buf()),
        })
    }

    /// Apply environment variable overrides
    ///
    /// Example: VBS_DATE_ORDER=dmy
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> ConfigResult<RuntimeConfig> {
        if self.ignore_env {
            return Ok(config);
        }

        if let Ok(order) = env::var(ENV_DATE_ORDER) {
            config.set_date_order(order.parse::<DateOrder>()?);
        }

        if let Ok(limit) = env::var(ENV_MAX_STRING_LENGTH) {
            let limit = limit
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: ENV_MAX_STRING_LENGTH.to_string(),
                    reason: e.to_string(),
                })?;
            config.set_max_string_length(limit);
        }

        if let Ok(flag) = env::var(ENV_LOG_TRAPPED_ERRORS) {
            let enabled = matches!(flag.to_lowercase().as_str(), "true" | "1" | "yes");
            config.set_log_trapped_errors(enabled);
        }

        config.validate()?;
        Ok(config)
    }
}

impl LoadedConfig {
    /// Effective date order
    pub fn date_order(&self) -> DateOrder {
        self.runtime.date_order()
    }

    /// Whether a vbs.toml was found
    pub fn is_project(&self) -> bool {
        self.source.is_some()
    }
}

/// Find vbs.toml by walking up from `start_dir`
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
