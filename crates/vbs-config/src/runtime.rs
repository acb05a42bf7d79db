//! Runtime configuration (vbs.toml)
//!
//! Every section is optional; missing values fall back to the VBScript
//! defaults (US date order, the full string ceiling, trap logging on).

use crate::{ConfigError, ConfigResult, MAX_STRING_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Runtime configuration from vbs.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Culture settings used by date parsing and formatting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culture: Option<CultureConfig>,

    /// Resource limits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsConfig>,

    /// Error trapping behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trapping: Option<TrappingConfig>,
}

/// Culture settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CultureConfig {
    /// Order of day, month and year in numeric date strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_order: Option<DateOrder>,
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum string length in UTF-16 code units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_string_length: Option<usize>,
}

/// Error trapping settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TrappingConfig {
    /// Emit a debug event whenever an error is trapped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_trapped_errors: Option<bool>,
}

/// Order of the numeric components of a date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateOrder {
    /// Month/day/year (en-US)
    #[default]
    Mdy,
    /// Day/month/year (en-GB and most of Europe)
    Dmy,
    /// Year-month-day (ISO 8601)
    Ymd,
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateOrder::Mdy => write!(f, "mdy"),
            DateOrder::Dmy => write!(f, "dmy"),
            DateOrder::Ymd => write!(f, "ymd"),
        }
    }
}

impl FromStr for DateOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mdy" => Ok(DateOrder::Mdy),
            "dmy" => Ok(DateOrder::Dmy),
            "ymd" => Ok(DateOrder::Ymd),
            other => Err(ConfigError::InvalidValue {
                field: "culture.date_order".to_string(),
                reason: format!("expected one of mdy, dmy, ymd, got '{}'", other),
            }),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: Path::new("<string>").to_path_buf(),
            error: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(limit) = self.limits.as_ref().and_then(|l| l.max_string_length) {
            if limit == 0 || limit > MAX_STRING_LENGTH {
                return Err(ConfigError::InvalidValue {
                    field: "limits.max_string_length".to_string(),
                    reason: format!("must be between 1 and {}, got {}", MAX_STRING_LENGTH, limit),
                });
            }
        }
        Ok(())
    }

    /// Effective date order (default: mdy)
    pub fn date_order(&self) -> DateOrder {
        self.culture
            .as_ref()
            .and_then(|c| c.date_order)
            .unwrap_or_default()
    }

    /// Effective string ceiling, never above [`MAX_STRING_LENGTH`]
    pub fn max_string_length(&self) -> usize {
        self.limits
            .as_ref()
            .and_then(|l| l.max_string_length)
            .map(|limit| limit.min(MAX_STRING_LENGTH))
            .unwrap_or(MAX_STRING_LENGTH)
    }

    /// Whether trapped errors are logged (default: true)
    pub fn log_trapped_errors(&self) -> bool {
        self.trapping
            .as_ref()
            .and_then(|t| t.log_trapped_errors)
            .unwrap_or(true)
    }

    /// Override the date order
    pub fn set_date_order(&mut self, order: DateOrder) {
        self.culture.get_or_insert_with(Default::default).date_order = Some(order);
    }

    /// Override the string ceiling
    pub fn set_max_string_length(&mut self, limit: usize) {
        self.limits.get_or_insert_with(Default::default).max_string_length = Some(limit);
    }

    /// Override trap logging
    pub fn set_log_trapped_errors(&mut self, enabled: bool) {
        self.trapping.get_or_insert_with(Default::default).log_trapped_errors = Some(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.date_order(), DateOrder::Mdy);
        assert_eq!(config.max_string_length(), MAX_STRING_LENGTH);
        assert!(config.log_trapped_errors());
    }

    #[test]
    fn test_parse_full_config() {
        let config = RuntimeConfig::parse(
            r#"
[culture]
date_order = "dmy"

[limits]
max_string_length = 64

[trapping]
log_trapped_errors = false
"#,
        )
        .unwrap();
        assert_eq!(config.date_order(), DateOrder::Dmy);
        assert_eq!(config.max_string_length(), 64);
        assert!(!config.log_trapped_errors());
    }

    #[test]
    fn test_zero_string_limit_rejected() {
        let result = RuntimeConfig::parse("[limits]\nmax_string_length = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_date_order_from_str() {
        assert_eq!("YMD".parse::<DateOrder>().unwrap(), DateOrder::Ymd);
        assert!("ydm".parse::<DateOrder>().is_err());
    }

    #[test]
    fn test_setters_create_sections() {
        let mut config = RuntimeConfig::default();
        config.set_date_order(DateOrder::Ymd);
        config.set_max_string_length(10);
        config.set_log_trapped_errors(false);
        assert_eq!(config.date_order(), DateOrder::Ymd);
        assert_eq!(config.max_string_length(), 10);
        assert!(!config.log_trapped_errors());
    }
}
