//! 编译期安装器注册表
//!
//! 插件 crate 通过 [`mediator_installer!`](crate::mediator_installer) 或
//! `inventory::submit!` 登记 [`MediatorInstallerEntry`]，宿主调用 [`discovered`]
//! 取得全部候选后交给运行器。运行器本身不读取注册表。

use crate::errors::BoxError;

use super::{InstallerDescriptor, MediatorInstaller, Priority};

/// 注册表条目
pub struct MediatorInstallerEntry {
    pub name: &'static str,
    pub priority: Option<u32>,
    pub factory: fn() -> Result<Box<dyn MediatorInstaller>, BoxError>,
}

impl MediatorInstallerEntry {
    pub const fn new(
        name: &'static str,
        priority: Option<u32>,
        factory: fn() -> Result<Box<dyn MediatorInstaller>, BoxError>,
    ) -> Self {
        Self {
            name,
            priority,
            factory,
        }
    }

    fn descriptor(&self) -> InstallerDescriptor {
        let descriptor = InstallerDescriptor::new(self.name, self.factory);
        match self.priority {
            Some(level) => descriptor.with_priority(Priority::new(level)),
            None => descriptor,
        }
    }
}

inventory::collect!(MediatorInstallerEntry);

/// 所有已登记的中介者安装器。顺序取决于链接顺序，不作保证
pub fn discovered() -> Vec<InstallerDescriptor> {
    inventory::iter::<MediatorInstallerEntry>
        .into_iter()
        .map(MediatorInstallerEntry::descriptor)
        .collect()
}

/// 登记一个实现了 `Default` 的中介者安装器
///
/// ```ignore
/// spin_installers::mediator_installer!(AuditInstaller, priority = 10);
/// ```
#[macro_export]
macro_rules! mediator_installer {
    (@submit $ty:ty, $priority:expr) => {
        $crate::inventory::submit! {
            $crate::installer::registry::MediatorInstallerEntry::new(
                ::core::stringify!($ty),
                $priority,
                || ::core::result::Result::Ok(
                    ::std::boxed::Box::new(<$ty as ::core::default::Default>::default())
                        as ::std::boxed::Box<dyn $crate::installer::MediatorInstaller>
                ),
            )
        }
    };
    ($ty:ty) => {
        $crate::mediator_installer!(@submit $ty, ::core::option::Option::None);
    };
    ($ty:ty, priority = $priority:expr) => {
        $crate::mediator_installer!(@submit $ty, ::core::option::Option::Some($priority));
    };
}
