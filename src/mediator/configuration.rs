use std::any::TypeId;

use crate::infrastructure::container::{ServiceContainer, ServiceLifetime};

/// 处理器类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// 一个请求只对应一个处理器
    Request,
    /// 一个通知可以有多个处理器
    Notification,
}

/// 处理器登记项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRegistration {
    pub kind: HandlerKind,
    pub message_type: TypeId,
    pub message_name: &'static str,
    pub handler_type: TypeId,
    pub handler_name: &'static str,
}

/// 管道行为登记项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorRegistration {
    pub behavior_type: TypeId,
    pub behavior_name: &'static str,
}

/// 中介者配置构建器，由各个中介者安装器依次修改
#[derive(Debug, Clone, Default)]
pub struct MediatorConfiguration {
    handlers: Vec<HandlerRegistration>,
    behaviors: Vec<BehaviorRegistration>,
    lifetime: ServiceLifetime,
}

impl MediatorConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记请求处理器
    pub fn register_request_handler<M: 'static, H: 'static>(&mut self) -> &mut Self {
        self.push_handler::<M, H>(HandlerKind::Request)
    }

    /// 登记通知处理器
    pub fn register_notification_handler<M: 'static, H: 'static>(&mut self) -> &mut Self {
        self.push_handler::<M, H>(HandlerKind::Notification)
    }

    fn push_handler<M: 'static, H: 'static>(&mut self, kind: HandlerKind) -> &mut Self {
        let registration = HandlerRegistration {
            kind,
            message_type: TypeId::of::<M>(),
            message_name: std::any::type_name::<M>(),
            handler_type: TypeId::of::<H>(),
            handler_name: std::any::type_name::<H>(),
        };

        if self.handlers.contains(&registration) {
            tracing::debug!(
                message = registration.message_name,
                handler = registration.handler_name,
                "Handler already registered, skipping"
            );
        } else {
            self.handlers.push(registration);
        }
        self
    }

    /// 追加管道行为，按登记顺序包裹处理器
    pub fn add_behavior<B: 'static>(&mut self) -> &mut Self {
        self.behaviors.push(BehaviorRegistration {
            behavior_type: TypeId::of::<B>(),
            behavior_name: std::any::type_name::<B>(),
        });
        self
    }

    /// 处理器在容器中的生命周期
    pub fn set_lifetime(&mut self, lifetime: ServiceLifetime) -> &mut Self {
        self.lifetime = lifetime;
        self
    }

    pub fn handlers(&self) -> &[HandlerRegistration] {
        &self.handlers
    }

    pub fn behaviors(&self) -> &[BehaviorRegistration] {
        &self.behaviors
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    /// 某个消息类型的全部处理器
    pub fn handlers_for<M: 'static>(&self) -> impl Iterator<Item = &HandlerRegistration> {
        let message_type = TypeId::of::<M>();
        self.handlers
            .iter()
            .filter(move |h| h.message_type == message_type)
    }
}

/// 定稿后的中介者，作为服务放入容器
#[derive(Debug, Clone)]
pub struct Mediator {
    configuration: MediatorConfiguration,
}

impl Mediator {
    pub fn configuration(&self) -> &MediatorConfiguration {
        &self.configuration
    }
}

/// 构建中介者配置并登记到容器。
///
/// `configure` 失败时直接返回错误，容器中不会出现 `Mediator`。
pub fn add_mediator<F, E>(services: &ServiceContainer, configure: F) -> Result<(), E>
where
    F: FnOnce(&mut MediatorConfiguration) -> Result<(), E>,
{
    let mut configuration = MediatorConfiguration::new();
    configure(&mut configuration)?;

    tracing::debug!(
        handlers = configuration.handlers().len(),
        behaviors = configuration.behaviors().len(),
        lifetime = ?configuration.lifetime(),
        "Registering mediator"
    );
    services.register_instance(Mediator { configuration });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BoxError;

    struct CreateOrbit;
    struct CreateOrbitHandler;
    struct OrbitCreated;
    struct AuditHandler;
    struct MetricsHandler;
    struct ValidationBehavior;
    struct LoggingBehavior;

    #[test]
    fn test_duplicate_handler_is_ignored() {
        let mut cfg = MediatorConfiguration::new();
        cfg.register_request_handler::<CreateOrbit, CreateOrbitHandler>()
            .register_request_handler::<CreateOrbit, CreateOrbitHandler>();

        assert_eq!(cfg.handlers().len(), 1);
        assert_eq!(cfg.handlers()[0].kind, HandlerKind::Request);
    }

    #[test]
    fn test_notification_handlers_are_grouped_by_message() {
        let mut cfg = MediatorConfiguration::new();
        cfg.register_notification_handler::<OrbitCreated, AuditHandler>()
            .register_request_handler::<CreateOrbit, CreateOrbitHandler>()
            .register_notification_handler::<OrbitCreated, MetricsHandler>();

        let names: Vec<_> = cfg
            .handlers_for::<OrbitCreated>()
            .map(|h| h.handler_name)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("AuditHandler"));
        assert!(names[1].ends_with("MetricsHandler"));
    }

    #[test]
    fn test_behaviors_keep_registration_order() {
        let mut cfg = MediatorConfiguration::new();
        cfg.add_behavior::<ValidationBehavior>()
            .add_behavior::<LoggingBehavior>()
            .set_lifetime(ServiceLifetime::Scoped);

        assert!(cfg.behaviors()[0].behavior_name.ends_with("ValidationBehavior"));
        assert!(cfg.behaviors()[1].behavior_name.ends_with("LoggingBehavior"));
        assert_eq!(cfg.lifetime(), ServiceLifetime::Scoped);
    }

    #[tokio::test]
    async fn test_add_mediator_registers_configuration() {
        let services = ServiceContainer::new();

        add_mediator::<_, BoxError>(&services, |cfg| {
            cfg.register_request_handler::<CreateOrbit, CreateOrbitHandler>();
            Ok(())
        })
        .unwrap();

        let mediator = services.resolve::<Mediator>().await.unwrap();
        assert_eq!(mediator.configuration().handlers().len(), 1);
    }

    #[tokio::test]
    async fn test_lifetime_is_recorded_not_applied() {
        let services = ServiceContainer::new();

        add_mediator::<_, BoxError>(&services, |cfg| {
            cfg.set_lifetime(ServiceLifetime::Transient);
            Ok(())
        })
        .unwrap();

        let first = services.resolve::<Mediator>().await.unwrap();
        let second = services.resolve::<Mediator>().await.unwrap();
        assert_eq!(first.configuration().lifetime(), ServiceLifetime::Transient);
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_add_mediator_failure_registers_nothing() {
        let services = ServiceContainer::new();

        let result = add_mediator::<_, BoxError>(&services, |_| Err("broken".into()));

        assert!(result.is_err());
        assert!(!services.is_registered::<Mediator>());
    }
}
