use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::errors::ConfigError;
use crate::logging::LogFormat;

use super::loader::{parse_scalar, ConfigLoader};

/// Prefix for environment overrides, e.g. `SPIN_LOGGING__LEVEL`
pub const ENV_PREFIX: &str = "SPIN_";

/// Main Application Configuration
///
/// Installers receive this read-only. Anything outside `[logging]` lands in
/// `settings` and is looked up with dotted keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(flatten)]
    pub settings: toml::Table,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::new().with_env().from_path(path)
    }

    /// Look up a setting by dotted key (`database.pool.size`)
    pub fn get_value(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let first = self.settings.get(parts.next()?)?;
        parts.try_fold(first, |value, part| value.as_table()?.get(part))
    }

    /// Typed lookup. `Ok(None)` when the key is absent, an error when it has the wrong shape.
    ///
    /// Keys added only through environment overrides are stored as strings, so a
    /// string that parses as a bool or number is retried as that scalar.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.get_value(key) else {
            return Ok(None);
        };

        let err = match value.clone().try_into() {
            Ok(typed) => return Ok(Some(typed)),
            Err(e) => e,
        };
        if let Some(scalar) = value.as_str().and_then(parse_scalar) {
            if let Ok(typed) = scalar.try_into() {
                return Ok(Some(typed));
            }
        }

        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }
}
