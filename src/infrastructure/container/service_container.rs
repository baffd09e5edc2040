//! 服务注册表
//!
//! 安装器通过它登记服务，宿主在启动完成后解析服务：
//! - 按类型登记工厂，后登记的覆盖先登记的
//! - 首次解析时创建实例，之后复用（OnceCell）
//! - 支持直接登记现成实例

use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::errors::{BoxError, ContainerError};

type SharedService = Arc<dyn Any + Send + Sync>;

/// 服务工厂trait
pub trait ServiceFactory: Send + Sync {
    /// 创建服务实例
    fn create(&self, container: &ServiceContainer) -> Result<SharedService, ContainerError>;

    /// 获取服务类型名称（用于错误信息）
    fn service_type_name(&self) -> &'static str;
}

/// 函数式服务工厂
struct FnServiceFactory<F, T> {
    factory_fn: F,
    type_name: &'static str,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<F, T> ServiceFactory for FnServiceFactory<F, T>
where
    F: Fn(&ServiceContainer) -> Result<T, BoxError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn create(&self, container: &ServiceContainer) -> Result<SharedService, ContainerError> {
        let service = (self.factory_fn)(container).map_err(|source| ContainerError::CreationFailed {
            service: self.type_name,
            source,
        })?;
        Ok(Arc::new(service))
    }

    fn service_type_name(&self) -> &'static str {
        self.type_name
    }
}

/// 现成实例
struct InstanceFactory {
    instance: SharedService,
    type_name: &'static str,
}

impl ServiceFactory for InstanceFactory {
    fn create(&self, _container: &ServiceContainer) -> Result<SharedService, ContainerError> {
        Ok(self.instance.clone())
    }

    fn service_type_name(&self) -> &'static str {
        self.type_name
    }
}

/// 服务容器。克隆后共享同一份注册表
#[derive(Clone, Default)]
pub struct ServiceContainer {
    factories: Arc<DashMap<TypeId, Arc<dyn ServiceFactory>>>,
    singletons: Arc<DashMap<TypeId, Arc<OnceCell<SharedService>>>>,
    stats: Arc<InnerStats>,
}

#[derive(Default)]
struct InnerStats {
    total_resolutions: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册服务工厂
    pub fn register<T, F>(&self, factory: F)
    where
        F: Fn(&ServiceContainer) -> Result<T, BoxError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        self.insert_factory(
            TypeId::of::<T>(),
            Arc::new(FnServiceFactory {
                factory_fn: factory,
                type_name,
                _phantom: std::marker::PhantomData,
            }),
        );
    }

    /// 注册单例服务 - 便捷方法
    pub fn register_singleton<T, F>(&self, factory: F)
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register(move |container| Ok(factory(container)));
    }

    /// 注册已经构造好的实例
    pub fn register_instance<T: Send + Sync + 'static>(&self, instance: T) {
        self.insert_factory(
            TypeId::of::<T>(),
            Arc::new(InstanceFactory {
                instance: Arc::new(instance),
                type_name: std::any::type_name::<T>(),
            }),
        );
    }

    fn insert_factory(&self, type_id: TypeId, factory: Arc<dyn ServiceFactory>) {
        tracing::trace!(service = factory.service_type_name(), "Registering service");
        self.factories.insert(type_id, factory);
        // 覆盖登记时丢弃旧的缓存实例
        self.singletons.remove(&type_id);
    }

    /// 解析服务
    pub async fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        self.stats.total_resolutions.fetch_add(1, Ordering::Relaxed);

        let type_id = TypeId::of::<T>();

        if let Some(service) = self.singletons.get(&type_id).and_then(|cell| cell.get().cloned()) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return downcast::<T>(service);
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);

        // 先取出工厂再释放读锁，工厂内部可能继续登记服务
        let factory = self
            .factories
            .get(&type_id)
            .map(|entry| entry.value().clone())
            .ok_or(ContainerError::ServiceNotRegistered {
                type_id,
                type_name: std::any::type_name::<T>(),
            })?;

        let once_cell = self
            .singletons
            .entry(type_id)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let service = once_cell
            .get_or_try_init(|| async { factory.create(self) })
            .await?
            .clone();

        downcast::<T>(service)
    }

    /// 检查服务是否已注册
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// 已注册服务的类型名称，顺序不保证
    pub fn registered_services(&self) -> Vec<&'static str> {
        self.factories
            .iter()
            .map(|entry| entry.value().service_type_name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            total_resolutions: self.stats.total_resolutions.load(Ordering::Relaxed),
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.stats.cache_misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.registered_services())
            .finish()
    }
}

fn downcast<T: Send + Sync + 'static>(service: SharedService) -> Result<Arc<T>, ContainerError> {
    service.downcast::<T>().map_err(|other| ContainerError::TypeCastFailed {
        expected: std::any::type_name::<T>().to_string(),
        actual: format!("{:?}", (*other).type_id()),
    })
}

/// 容器统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerStats {
    pub total_resolutions: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

impl ContainerStats {
    /// 获取缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_resolutions == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_resolutions as f64
        }
    }
}
