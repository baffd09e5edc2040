//! 中介者配置
//!
//! 只负责收集请求/通知处理器与管道行为的登记信息，并把定稿的配置放进容器。
//! 消息分发不在这里实现。

pub mod configuration;

pub use configuration::{
    add_mediator, BehaviorRegistration, HandlerKind, HandlerRegistration, Mediator,
    MediatorConfiguration,
};
