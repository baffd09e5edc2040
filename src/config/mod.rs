pub mod app_config;
pub mod loader;

pub use app_config::{AppConfig, LoggingSection, ENV_PREFIX};
pub use loader::ConfigLoader;
