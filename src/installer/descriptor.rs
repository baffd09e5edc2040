use std::fmt;
use std::sync::Arc;

use crate::errors::BoxError;

use super::{MediatorInstaller, Priority};

/// 无参构造函数
pub type InstallerFactory =
    Arc<dyn Fn() -> Result<Box<dyn MediatorInstaller>, BoxError> + Send + Sync>;

/// 候选类型的种类
#[derive(Clone)]
pub enum DescriptorKind {
    /// 可以构造的具体类型
    Concrete(InstallerFactory),
    /// 只声明了能力，不能构造，运行时跳过
    Abstract,
}

/// 一个中介者安装器候选：名称、可选优先级和构造方式
#[derive(Clone)]
pub struct InstallerDescriptor {
    name: String,
    priority: Option<Priority>,
    kind: DescriptorKind,
}

impl InstallerDescriptor {
    /// 使用自定义构造函数
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn MediatorInstaller>, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            priority: None,
            kind: DescriptorKind::Concrete(Arc::new(factory)),
        }
    }

    /// 通过 `Default` 构造
    pub fn of<T>() -> Self
    where
        T: MediatorInstaller + Default + 'static,
    {
        Self::new(short_type_name::<T>(), || Ok(Box::new(T::default()) as Box<dyn MediatorInstaller>))
    }

    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            kind: DescriptorKind::Abstract,
        }
    }

    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.kind
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, DescriptorKind::Concrete(_))
    }
}

impl fmt::Debug for InstallerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallerDescriptor")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("concrete", &self.is_concrete())
            .finish()
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
