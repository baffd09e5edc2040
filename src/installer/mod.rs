//! 安装器
//!
//! 两层扩展点：
//! - [`Installer`]：启动流程中的安装器，按优先级依次执行
//! - [`MediatorInstaller`]：在中介者配置阶段执行的插件，由
//!   [`MediatorBootstrapInstaller`] 负责实例化、排序和调用

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::errors::BoxError;
use crate::infrastructure::container::ServiceContainer;
use crate::mediator::MediatorConfiguration;

pub mod bootstrap;
pub mod descriptor;
pub mod mediator_installer;
pub mod priority;
pub mod registry;
pub mod runner;

pub use bootstrap::Bootstrapper;
pub use descriptor::{DescriptorKind, InstallerDescriptor};
pub use mediator_installer::MediatorBootstrapInstaller;
pub use priority::Priority;
pub use registry::MediatorInstallerEntry;
pub use runner::run_mediator_installers;

/// 安装器返回值，插件可返回任意错误
pub type InstallResult = Result<(), BoxError>;

/// 启动安装器
#[async_trait]
pub trait Installer: Send + Sync {
    /// 安装器名称，用于日志和错误信息
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// 声明的优先级，`None` 排在最后
    fn priority(&self) -> Option<Priority> {
        None
    }

    /// 向容器登记服务
    async fn install_service(&self, services: &ServiceContainer, config: &AppConfig) -> InstallResult;
}

/// 中介者安装器插件
///
/// 每个实例只会被调用一次。调用期间可以修改中介者配置和服务容器。
pub trait MediatorInstaller: Send + Sync {
    fn install_service(
        &self,
        mediator: &mut MediatorConfiguration,
        services: &ServiceContainer,
        config: &AppConfig,
    ) -> InstallResult;
}
