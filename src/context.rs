mod cache;
mod config;
mod registry;
mod rules;

pub use cache::*;
pub use config::*;
pub use registry::*;
pub use rules::*;

use crate::{
    DynSvc, InjectError, InjectResult, InjectionPoint, Interface, Introspect,
    Marker, RequestInfo, Resolved, Service, ServiceInfo, Svc,
};
use std::fmt::{Debug, Formatter};
use tracing::{debug, trace, warn};

/// Produces the value bound to an injection point. The value is always a
/// [`Svc<I>`] for the interface `I` of the point, boxed as [`Resolved`].
pub type Producer = Svc<
    dyn Fn(&InjectionContext, &RequestInfo) -> InjectResult<Resolved>
        + Send
        + Sync,
>;

pub(crate) fn producer<F>(produce: F) -> Producer
where
    F: Fn(&InjectionContext, &RequestInfo) -> InjectResult<Resolved>
        + Send
        + Sync
        + 'static,
{
    Svc::new(produce)
}

/// Owns the bindings, the class metadata and the singleton instances of an
/// injector. Cloning a context is cheap; clones share all of their state.
#[derive(Clone)]
pub struct InjectionContext {
    inner: Svc<ContextInner>,
}

struct ContextInner {
    bindings: BindingRegistry,
    singletons: SingletonCache,
    introspect: Svc<dyn Introspect>,
    config: InjectorConfig,
}

impl InjectionContext {
    /// Creates a context with the default configuration.
    #[must_use]
    pub fn new(introspect: Svc<dyn Introspect>) -> Self {
        InjectionContext::with_config(introspect, InjectorConfig::default())
    }

    /// Creates a context.
    #[must_use]
    pub fn with_config(
        introspect: Svc<dyn Introspect>,
        config: InjectorConfig,
    ) -> Self {
        InjectionContext {
            inner: Svc::new(ContextInner {
                bindings: BindingRegistry::new(),
                singletons: SingletonCache::new(),
                introspect,
                config,
            }),
        }
    }

    /// The class metadata this context builds from.
    #[must_use]
    pub fn introspect(&self) -> &dyn Introspect {
        &*self.inner.introspect
    }

    /// The configuration of this context.
    #[must_use]
    pub fn config(&self) -> &InjectorConfig {
        &self.inner.config
    }

    /// The declared bindings.
    #[must_use]
    pub fn bindings(&self) -> &BindingRegistry {
        &self.inner.bindings
    }

    /// The singleton instances created so far.
    #[must_use]
    pub fn singletons(&self) -> &SingletonCache {
        &self.inner.singletons
    }

    /// Starts declaring a binding for `I`, qualified by `markers`.
    ///
    /// ```
    /// use graph_injector::{
    ///     interface, ClassInfo, Constructor, Injector, Marker, Named,
    ///     Service, Svc,
    /// };
    ///
    /// trait Engine: Service {
    ///     fn cylinders(&self) -> u8;
    /// }
    ///
    /// struct V8Engine;
    ///
    /// impl Engine for V8Engine {
    ///     fn cylinders(&self) -> u8 {
    ///         8
    ///     }
    /// }
    ///
    /// interface!(Engine = [V8Engine]);
    ///
    /// let mut builder = Injector::builder();
    /// builder.register(
    ///     ClassInfo::builder::<V8Engine>()
    ///         .constructor(Constructor::new(), |_| Ok(V8Engine))
    ///         .build(),
    /// );
    /// let injector = builder.build();
    ///
    /// let big = Marker::new(Named::new("big"));
    /// injector
    ///     .binding_for::<dyn Engine>([big.clone()])
    ///     .map::<V8Engine>()
    ///     .unwrap();
    ///
    /// let engine: Svc<dyn Engine> = injector.get_qualified([big]).unwrap();
    /// assert_eq!(8, engine.cylinders());
    /// assert!(injector.get_instance::<dyn Engine>().is_err());
    /// ```
    #[must_use]
    pub fn binding_for<I: ?Sized + Interface>(
        &self,
        markers: impl IntoIterator<Item = Marker>,
    ) -> BindingBuilder<'_, I> {
        self.binding_for_point(InjectionPoint::of::<I>(markers))
    }

    /// Starts declaring a binding of an explicit injection point, whose
    /// values are `Svc<I>`.
    #[must_use]
    pub fn binding_for_point<I: ?Sized + Interface>(
        &self,
        point: InjectionPoint,
    ) -> BindingBuilder<'_, I> {
        BindingBuilder::new(self, point)
    }

    /// Starts declaring a provider binding for `T`. Requests for
    /// `dyn Provider<T>` qualified by `markers` then receive a provider.
    #[must_use]
    pub fn provider_binding_for<T: ?Sized + Service>(
        &self,
        markers: impl IntoIterator<Item = Marker>,
    ) -> ProviderBindingBuilder<'_, T> {
        ProviderBindingBuilder::new(self, markers)
    }

    /// Declares a binding, applying the configured duplicate policy.
    pub fn add(
        &self,
        point: InjectionPoint,
        producer: Producer,
    ) -> InjectResult<()> {
        validate(&point)?;
        debug!(%point, "binding declared");
        match self.config().duplicate_bindings {
            DuplicateBindings::Reject => self
                .bindings()
                .try_put(point, producer)
                .map_err(|point| InjectError::DuplicateBinding { point }),
            DuplicateBindings::Overwrite => {
                if self.bindings().put(point.clone(), producer).is_some() {
                    warn!(%point, "binding replaced an earlier declaration");
                }
                Ok(())
            }
        }
    }

    /// Gets the producer bound to a point.
    pub fn lookup(&self, point: &InjectionPoint) -> InjectResult<Producer> {
        trace!(%point, "looking up binding");
        validate(point)?;
        self.bindings()
            .get(point)
            .ok_or_else(|| InjectError::UnresolvedBinding {
                point: point.clone(),
            })
    }

    /// Produces the value bound to a point.
    pub fn resolve(
        &self,
        point: &InjectionPoint,
        request_info: &RequestInfo,
    ) -> InjectResult<Resolved> {
        let producer = self.lookup(point)?;
        producer(self, request_info)
    }

    /// Calls `factory` for prototype-scoped types. For singleton-scoped
    /// types the cached instance is returned instead, and `factory` is only
    /// called if there is none yet.
    pub fn cached_or_build<F>(
        &self,
        service_info: ServiceInfo,
        factory: F,
    ) -> InjectResult<DynSvc>
    where
        F: FnOnce() -> InjectResult<DynSvc>,
    {
        if self.introspect().is_singleton(service_info) {
            self.singletons().get_or_try_init(service_info, factory)
        } else {
            factory()
        }
    }
}

fn validate(point: &InjectionPoint) -> InjectResult<()> {
    point
        .validate()
        .map_err(|source| InjectError::MalformedMarker {
            point: point.clone(),
            source,
        })
}

impl Debug for InjectionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionContext")
            .field("bindings", self.bindings())
            .field("singletons", self.singletons())
            .field("config", self.config())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassInfo, ClassRegistry};

    struct Counter;

    fn context(config: InjectorConfig) -> InjectionContext {
        let mut classes = ClassRegistry::new();
        classes.register(ClassInfo::builder::<Counter>().singleton().build());
        InjectionContext::with_config(Svc::new(classes), config)
    }

    fn constant(value: u8) -> Producer {
        producer(move |_, _| Ok(Box::new(Svc::new(value)) as Resolved))
    }

    fn resolve_u8(context: &InjectionContext) -> u8 {
        let resolved = context
            .resolve(&InjectionPoint::of::<u8>([]), &RequestInfo::new())
            .unwrap();
        **resolved.downcast::<Svc<u8>>().unwrap()
    }

    #[test]
    fn lookup_of_unbound_point_fails() {
        let context = context(InjectorConfig::default());
        let point = InjectionPoint::of::<u8>([]);
        match context.lookup(&point) {
            Err(InjectError::UnresolvedBinding { point: missing })
                if missing == point => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => panic!("point should be unbound"),
        }
    }

    #[test]
    fn duplicates_are_rejected_by_default() {
        let context = context(InjectorConfig::default());
        let point = InjectionPoint::of::<u8>([]);

        context.add(point.clone(), constant(1)).unwrap();
        assert!(matches!(
            context.add(point, constant(2)),
            Err(InjectError::DuplicateBinding { .. })
        ));
        assert_eq!(1, resolve_u8(&context));
    }

    #[test]
    fn duplicates_can_overwrite() {
        let context = context(InjectorConfig {
            duplicate_bindings: DuplicateBindings::Overwrite,
        });
        let point = InjectionPoint::of::<u8>([]);

        context.add(point.clone(), constant(1)).unwrap();
        context.add(point, constant(2)).unwrap();
        assert_eq!(2, resolve_u8(&context));
    }

    #[test]
    fn prototype_factory_runs_every_time() {
        let context = context(InjectorConfig::default());
        let mut calls = 0;
        for _ in 0..2 {
            context
                .cached_or_build(ServiceInfo::of::<u8>(), || {
                    calls += 1;
                    Ok(Svc::new(0u8) as DynSvc)
                })
                .unwrap();
        }
        assert_eq!(2, calls);
    }

    #[test]
    fn singleton_factory_runs_once() {
        let context = context(InjectorConfig::default());
        let mut calls = 0;
        let mut build = || {
            context
                .cached_or_build(ServiceInfo::of::<Counter>(), || {
                    calls += 1;
                    Ok(Svc::new(Counter) as DynSvc)
                })
                .unwrap()
        };

        let first = build();
        let second = build();
        assert!(Svc::ptr_eq(&first, &second));
        assert_eq!(1, calls);
    }
}
