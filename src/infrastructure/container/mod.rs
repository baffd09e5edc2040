//! Container module

pub mod service_container;

pub use service_container::{ContainerStats, ServiceContainer, ServiceFactory};

/// 服务生命周期
///
/// 只是登记信息，由 `MediatorConfiguration` 记录给处理器使用。
/// `ServiceContainer` 本身对所有登记都缓存唯一实例，不区分生命周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceLifetime {
    /// Handlers are meant to live as long as the application
    Singleton,
    /// Handlers are meant to be created for each message
    #[default]
    Transient,
    /// Handlers are meant to be shared within one request scope
    Scoped,
}
