use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{BoxError, InstallerError};
use crate::infrastructure::container::ServiceContainer;
use crate::logging::OperationTimer;

use super::priority::sort_by_priority;
use super::{Installer, Priority};

/// 启动流程：按优先级依次执行启动安装器，遇到错误立即停止
#[derive(Default)]
pub struct Bootstrapper {
    installers: Vec<Arc<dyn Installer>>,
}

impl Bootstrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installer<I: Installer + 'static>(mut self, installer: I) -> Self {
        self.installers.push(Arc::new(installer));
        self
    }

    pub fn add_installer(&mut self, installer: Arc<dyn Installer>) {
        self.installers.push(installer);
    }

    pub fn len(&self) -> usize {
        self.installers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installers.is_empty()
    }

    /// 执行全部安装器
    pub async fn run(&self, services: &ServiceContainer, config: &AppConfig) -> Result<(), InstallerError> {
        let _timer = OperationTimer::new("bootstrap");

        let mut ordered = self.installers.clone();
        sort_by_priority(&mut ordered, |installer| installer.priority());

        for installer in &ordered {
            tracing::debug!(
                installer = installer.name(),
                priority = %Priority::resolve(installer.priority()),
                "Running installer"
            );

            if let Err(source) = installer.install_service(services, config).await {
                let err = into_installer_error(installer.name(), source);
                tracing::error!(installer = installer.name(), error = %err, "Startup aborted");
                return Err(err);
            }
        }

        tracing::info!(installers = ordered.len(), services = services.len(), "Bootstrap completed");
        Ok(())
    }
}

/// 内层已经是安装器错误时原样返回，不再包一层
fn into_installer_error(name: &str, source: BoxError) -> InstallerError {
    match source.downcast::<InstallerError>() {
        Ok(inner) => *inner,
        Err(source) => InstallerError::Invocation {
            installer: name.to_string(),
            source,
        },
    }
}
