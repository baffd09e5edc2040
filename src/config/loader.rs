use std::{env, fs, path::Path};

use crate::errors::ConfigError;

use super::app_config::{AppConfig, ENV_PREFIX};

/// Configuration loader responsible for loading config from files and environment
#[derive(Debug, Default)]
pub struct ConfigLoader {
    env_overrides: Vec<(String, String)>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `SPIN_`-prefixed variables from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_vars(env::vars())
    }

    /// Apply overrides from an explicit variable list (for testing)
    pub fn with_env_vars<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env_overrides.extend(
            vars.into_iter()
                .filter_map(|(k, v)| k.strip_prefix(ENV_PREFIX).map(|key| (env_key_to_path(key), v))),
        );
        self
    }

    /// Load configuration from a TOML file
    pub fn from_path(&self, path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.display().to_string(), e))?;
        self.from_str(&content, &path.display().to_string())
    }

    /// Parse configuration text. `origin` only shows up in error messages.
    pub fn from_str(&self, content: &str, origin: &str) -> Result<AppConfig, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)
            .map_err(|e| ConfigError::TomlParse(origin.to_string(), e))?;

        for (path, raw) in &self.env_overrides {
            tracing::debug!(key = %path, "Applying environment override");
            let value = coerce(path, raw, lookup(&table, path))?;
            set_path(&mut table, path, value)?;
        }

        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::TomlParse(origin.to_string(), e))
    }
}

/// `LOGGING__LEVEL` -> `logging.level`
fn env_key_to_path(key: &str) -> String {
    key.split("__")
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(".")
}

fn lookup<'a>(table: &'a toml::Table, path: &str) -> Option<&'a toml::Value> {
    let mut parts = path.split('.');
    let first = table.get(parts.next()?)?;
    parts.try_fold(first, |value, part| value.as_table()?.get(part))
}

/// 已有的键按原类型解析，新键保留字符串，交给 `AppConfig::get` 按目标类型解释
fn coerce(path: &str, raw: &str, existing: Option<&toml::Value>) -> Result<toml::Value, ConfigError> {
    let value = match existing {
        Some(toml::Value::Boolean(_)) => raw.parse().ok().map(toml::Value::Boolean),
        Some(toml::Value::Integer(_)) => raw.parse().ok().map(toml::Value::Integer),
        Some(toml::Value::Float(_)) => raw.parse().ok().map(toml::Value::Float),
        _ => Some(toml::Value::String(raw.to_string())),
    };

    value.ok_or_else(|| ConfigError::InvalidValue {
        key: path.to_string(),
        reason: format!(
            "expected {}, got '{}'",
            existing.map_or("string", toml::Value::type_str),
            raw
        ),
    })
}

/// 把字符串当作标量解析，解析不了返回 `None`
pub(super) fn parse_scalar(raw: &str) -> Option<toml::Value> {
    if let Ok(b) = raw.parse::<bool>() {
        Some(toml::Value::Boolean(b))
    } else if let Ok(i) = raw.parse::<i64>() {
        Some(toml::Value::Integer(i))
    } else {
        raw.parse::<f64>().ok().map(toml::Value::Float)
    }
}

fn set_path(table: &mut toml::Table, path: &str, value: toml::Value) -> Result<(), ConfigError> {
    let mut parts: Vec<&str> = path.split('.').collect();
    let Some(leaf) = parts.pop() else {
        return Ok(());
    };

    let mut current = table;
    for part in parts {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        current = entry.as_table_mut().ok_or_else(|| ConfigError::InvalidValue {
            key: path.to_string(),
            reason: format!("'{}' is not a table", part),
        })?;
    }
    current.insert(leaf.to_string(), value);
    Ok(())
}
