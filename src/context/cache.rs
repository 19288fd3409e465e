use crate::{DynSvc, InjectResult, ServiceInfo, Svc};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::fmt::{Debug, Formatter};
use tracing::debug;

/// Instances of singleton-scoped types, created at most once per type and
/// kept for the lifetime of the cache.
#[derive(Default)]
pub struct SingletonCache {
    instances: DashMap<ServiceInfo, Svc<OnceCell<DynSvc>>>,
}

impl SingletonCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        SingletonCache::default()
    }

    /// Gets the instance of a type, calling `factory` to create it if there
    /// is none yet. Concurrent callers for the same type wait for a single
    /// call to `factory` and share its result. A failed call leaves the type
    /// without an instance, so a later caller tries again.
    ///
    /// Cycles are only detected along a single request path. If two
    /// singletons that depend on each other are first requested on two
    /// threads at the same time, each thread waits on the other's
    /// initialization and neither returns.
    pub fn get_or_try_init<F>(
        &self,
        service_info: ServiceInfo,
        factory: F,
    ) -> InjectResult<DynSvc>
    where
        F: FnOnce() -> InjectResult<DynSvc>,
    {
        // The map shard must not stay locked while the factory runs, since
        // the factory may build other singletons.
        let cell = self.instances.entry(service_info).or_default().clone();
        cell.get_or_try_init(|| {
            let instance = factory()?;
            debug!(service = %service_info, "singleton created");
            Ok(instance)
        })
        .cloned()
    }

    /// Gets the instance of a type if it has been created.
    #[must_use]
    pub fn get(&self, service_info: ServiceInfo) -> Option<DynSvc> {
        self.instances
            .get(&service_info)
            .and_then(|cell| cell.get().cloned())
    }

    /// The number of types with a created instance.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances
            .iter()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    /// Whether no instance has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Debug for SingletonCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InjectError;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    #[test]
    fn concurrent_callers_share_one_instance() {
        let cache = SingletonCache::new();
        let calls = AtomicUsize::new(0);
        let service_info = ServiceInfo::of::<u8>();

        let instances: Vec<DynSvc> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache
                            .get_or_try_init(service_info, || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                thread::yield_now();
                                Ok(Svc::new(1u8) as DynSvc)
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(1, calls.load(Ordering::SeqCst));
        assert!(instances
            .iter()
            .all(|instance| Svc::ptr_eq(instance, &instances[0])));
        assert_eq!(1, cache.len());
    }

    #[test]
    fn failed_factory_is_retried() {
        let cache = SingletonCache::new();
        let service_info = ServiceInfo::of::<u8>();

        let failed = cache.get_or_try_init(service_info, || {
            Err(InjectError::InternalError("boom".to_owned()))
        });
        assert!(failed.is_err());
        assert!(cache.get(service_info).is_none());

        let created = cache
            .get_or_try_init(service_info, || Ok(Svc::new(2u8) as DynSvc))
            .unwrap();
        assert!(Svc::ptr_eq(&created, &cache.get(service_info).unwrap()));
    }
}
