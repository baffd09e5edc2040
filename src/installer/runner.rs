use crate::config::AppConfig;
use crate::errors::InstallerError;
use crate::infrastructure::container::ServiceContainer;
use crate::logging::OperationTimer;
use crate::mediator::MediatorConfiguration;

use super::descriptor::{DescriptorKind, InstallerDescriptor};
use super::priority::sort_by_priority;
use super::{MediatorInstaller, Priority};

/// 运行中介者安装器插件。
///
/// 1. 跳过抽象候选
/// 2. 逐个构造，任何一个失败都直接返回，不会调用任何安装器
/// 3. 按优先级升序排列，未声明的排在最后
/// 4. 依次调用，第一个失败即中止，之前安装器造成的修改保留
pub fn run_mediator_installers(
    candidates: &[InstallerDescriptor],
    mediator: &mut MediatorConfiguration,
    services: &ServiceContainer,
    config: &AppConfig,
) -> Result<(), InstallerError> {
    let _timer = OperationTimer::new("run_mediator_installers");

    let mut installers = instantiate(candidates)?;
    sort_by_priority(&mut installers, |(descriptor, _)| descriptor.priority());

    tracing::debug!(
        candidates = candidates.len(),
        installers = installers.len(),
        "Running mediator installers"
    );

    for (descriptor, installer) in &installers {
        tracing::debug!(
            installer = descriptor.name(),
            priority = %Priority::resolve(descriptor.priority()),
            "Invoking mediator installer"
        );
        installer
            .install_service(mediator, services, config)
            .map_err(|source| InstallerError::Invocation {
                installer: descriptor.name().to_string(),
                source,
            })?;
    }

    Ok(())
}

fn instantiate(
    candidates: &[InstallerDescriptor],
) -> Result<Vec<(&InstallerDescriptor, Box<dyn MediatorInstaller>)>, InstallerError> {
    candidates
        .iter()
        .filter_map(|descriptor| match descriptor.kind() {
            DescriptorKind::Concrete(factory) => Some((descriptor, factory)),
            DescriptorKind::Abstract => {
                tracing::trace!(installer = descriptor.name(), "Skipping abstract installer");
                None
            }
        })
        .map(|(descriptor, factory)| {
            factory()
                .map(|installer| (descriptor, installer))
                .map_err(|source| InstallerError::Instantiation {
                    installer: descriptor.name().to_string(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::InstallResult;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recording {
        label: String,
        log: Log,
        fail: bool,
    }

    struct PingHandler;
    struct Ping;

    impl MediatorInstaller for Recording {
        fn install_service(
            &self,
            mediator: &mut MediatorConfiguration,
            _services: &ServiceContainer,
            _config: &AppConfig,
        ) -> InstallResult {
            self.log.lock().unwrap().push(self.label.clone());
            if self.fail {
                return Err(format!("{} exploded", self.label).into());
            }
            mediator.add_behavior::<Recording>();
            Ok(())
        }
    }

    fn recorder(label: &str, priority: Option<u32>, log: &Log) -> InstallerDescriptor {
        recorder_with(label, priority, log, false)
    }

    fn recorder_with(label: &str, priority: Option<u32>, log: &Log, fail: bool) -> InstallerDescriptor {
        let log = log.clone();
        let owned = label.to_string();
        let descriptor = InstallerDescriptor::new(label, move || {
            Ok(Box::new(Recording {
                label: owned.clone(),
                log: log.clone(),
                fail,
            }) as Box<dyn MediatorInstaller>)
        });
        match priority {
            Some(p) => descriptor.with_priority(p),
            None => descriptor,
        }
    }

    fn run(candidates: &[InstallerDescriptor]) -> (Result<(), InstallerError>, MediatorConfiguration) {
        let mut mediator = MediatorConfiguration::new();
        let result = run_mediator_installers(
            candidates,
            &mut mediator,
            &ServiceContainer::new(),
            &AppConfig::default(),
        );
        (result, mediator)
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_declared_before_undeclared() {
        let log = Log::default();
        let candidates = vec![
            recorder("A", Some(10), &log),
            recorder("C", None, &log),
            recorder("B", Some(5), &log),
        ];

        let (result, _) = run(&candidates);

        assert!(result.is_ok());
        assert_eq!(entries(&log), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_distinct_priorities_run_ascending() {
        let log = Log::default();
        let candidates = vec![
            recorder("p300", Some(300), &log),
            recorder("p0", Some(0), &log),
            recorder("max-1", Some(u32::MAX - 1), &log),
            recorder("p42", Some(42), &log),
            recorder("mid", Some(Priority::MIDPOINT.level()), &log),
        ];

        run(&candidates).0.unwrap();

        assert_eq!(entries(&log), vec!["p0", "p42", "p300", "mid", "max-1"]);
    }

    #[test]
    fn test_undeclared_run_after_every_declared() {
        let log = Log::default();
        let candidates = vec![
            recorder("u1", None, &log),
            recorder("d1", Some(u32::MAX - 1), &log),
            recorder("u2", None, &log),
            recorder("d2", Some(1), &log),
        ];

        run(&candidates).0.unwrap();

        let order = entries(&log);
        assert_eq!(&order[..2], &["d2", "d1"]);
        // 相同优先级之间的顺序不作保证
        let mut tail = order[2..].to_vec();
        tail.sort();
        assert_eq!(tail, vec!["u1", "u2"]);
    }

    #[test]
    fn test_empty_candidates() {
        let (result, mediator) = run(&[]);

        assert!(result.is_ok());
        assert!(mediator.behaviors().is_empty());
    }

    #[test]
    fn test_failure_stops_remaining_installers() {
        let log = Log::default();
        let candidates = vec![
            recorder("after", Some(30), &log),
            recorder_with("D", Some(20), &log, true),
            recorder("before", Some(10), &log),
        ];

        let (result, mediator) = run(&candidates);

        let err = result.unwrap_err();
        assert!(matches!(err, InstallerError::Invocation { .. }));
        assert_eq!(err.installer(), "D");
        assert_eq!(err.source().map(|s| s.to_string()), Some("D exploded".to_string()));
        assert_eq!(entries(&log), vec!["before", "D"]);
        // 之前安装器的修改保留
        assert_eq!(mediator.behaviors().len(), 1);
    }

    #[test]
    fn test_abstract_candidates_are_skipped() {
        let log = Log::default();
        let candidates = vec![
            InstallerDescriptor::abstract_type("BaseInstaller").with_priority(1),
            recorder("concrete", Some(2), &log),
        ];

        run(&candidates).0.unwrap();

        assert_eq!(entries(&log), vec!["concrete"]);
    }

    #[test]
    fn test_instantiation_failure_invokes_nothing() {
        let log = Log::default();
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = constructed.clone();
        let candidates = vec![
            recorder("first", Some(1), &log),
            InstallerDescriptor::new("NeedsArguments", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("no parameterless constructor".into())
            })
            .with_priority(50),
        ];

        let (result, _) = run(&candidates);

        let err = result.unwrap_err();
        assert!(matches!(err, InstallerError::Instantiation { .. }));
        assert_eq!(err.installer(), "NeedsArguments");
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_installers_share_context() {
        struct RegistersHandler;
        impl MediatorInstaller for RegistersHandler {
            fn install_service(
                &self,
                mediator: &mut MediatorConfiguration,
                services: &ServiceContainer,
                config: &AppConfig,
            ) -> InstallResult {
                mediator.register_request_handler::<Ping, PingHandler>();
                services.register_instance(config.logging.level.clone());
                Ok(())
            }
        }

        struct ReadsPrevious;
        impl MediatorInstaller for ReadsPrevious {
            fn install_service(
                &self,
                mediator: &mut MediatorConfiguration,
                services: &ServiceContainer,
                _config: &AppConfig,
            ) -> InstallResult {
                if mediator.handlers_for::<Ping>().count() != 1 || !services.is_registered::<String>() {
                    return Err("previous installer did not run".into());
                }
                Ok(())
            }
        }

        let candidates = vec![
            InstallerDescriptor::new("ReadsPrevious", || Ok(Box::new(ReadsPrevious) as Box<dyn MediatorInstaller>))
                .with_priority(2),
            InstallerDescriptor::new("RegistersHandler", || Ok(Box::new(RegistersHandler) as Box<dyn MediatorInstaller>))
                .with_priority(1),
        ];

        let (result, mediator) = run(&candidates);

        assert!(result.is_ok());
        assert_eq!(mediator.handlers().len(), 1);
    }
}
