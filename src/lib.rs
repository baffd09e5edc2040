pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod installer;
pub mod logging;
pub mod mediator;

// Re-exported for `mediator_installer!`
pub use inventory;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use errors::{AppError, BoxError, InstallerError};
pub use infrastructure::{ServiceContainer, ServiceLifetime};
pub use installer::{
    Bootstrapper, InstallResult, Installer, InstallerDescriptor, MediatorBootstrapInstaller,
    MediatorInstaller, Priority,
};
pub use mediator::{Mediator, MediatorConfiguration};
