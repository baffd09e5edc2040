//! 基础设施层
//!
//! 目前只有依赖注入容器

pub mod container;

pub use container::{ContainerStats, ServiceContainer, ServiceLifetime};
