use async_trait::async_trait;

use crate::config::AppConfig;
use crate::errors::InstallerError;
use crate::infrastructure::container::ServiceContainer;
use crate::mediator::add_mediator;

use super::runner::run_mediator_installers;
use super::{registry, InstallResult, Installer, InstallerDescriptor, Priority};

/// 启动安装器：登记中介者，并在配置阶段运行全部中介者安装器插件
pub struct MediatorBootstrapInstaller {
    candidates: Vec<InstallerDescriptor>,
}

impl MediatorBootstrapInstaller {
    pub fn new(candidates: Vec<InstallerDescriptor>) -> Self {
        Self { candidates }
    }

    /// 使用编译期注册表中的全部插件
    pub fn discovered() -> Self {
        Self::new(registry::discovered())
    }

    pub fn candidates(&self) -> &[InstallerDescriptor] {
        &self.candidates
    }
}

#[async_trait]
impl Installer for MediatorBootstrapInstaller {
    fn name(&self) -> &str {
        "MediatorInstaller"
    }

    fn priority(&self) -> Option<Priority> {
        Some(Priority::MIDPOINT)
    }

    async fn install_service(&self, services: &ServiceContainer, config: &AppConfig) -> InstallResult {
        add_mediator::<_, InstallerError>(services, |mediator| {
            run_mediator_installers(&self.candidates, mediator, services, config)
        })?;
        Ok(())
    }
}
