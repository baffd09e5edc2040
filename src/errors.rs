use std::any::TypeId;
use thiserror::Error;

/// 安装器对外返回的错误类型，插件可用任意错误实现
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
    #[error("Installer error: {0}")]
    Installer(#[from] InstallerError),
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// 依赖注入容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service not registered: {type_name}")]
    ServiceNotRegistered {
        type_id: TypeId,
        type_name: &'static str,
    },
    #[error("Type cast failed: expected {expected}, got {actual}")]
    TypeCastFailed { expected: String, actual: String },
    #[error("Service creation failed for {service}: {source}")]
    CreationFailed {
        service: &'static str,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// 安装器执行错误。两类错误都不在本地恢复，直接交给启动流程
#[derive(Debug, Error)]
pub enum InstallerError {
    /// 发现的安装器无法构造
    #[error("Failed to instantiate installer '{installer}': {source}")]
    Instantiation {
        installer: String,
        #[source]
        source: BoxError,
    },
    /// 安装器的 install 操作失败
    #[error("Installer '{installer}' failed: {source}")]
    Invocation {
        installer: String,
        #[source]
        source: BoxError,
    },
}

impl InstallerError {
    /// 出错的安装器名称
    pub fn installer(&self) -> &str {
        match self {
            InstallerError::Instantiation { installer, .. }
            | InstallerError::Invocation { installer, .. } => installer,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),
    #[error("Global subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

pub fn config_error<S: Into<String>>(key: S, reason: S) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        reason: reason.into(),
    }
}
