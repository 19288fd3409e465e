use crate::{
    context::producer, GraphBuilder, InjectError, InjectResult,
    InjectionContext, InjectionPoint, Interface, InterfaceFor, LazyProvider,
    Marker, Provider, Resolved, Service, ServiceInfo, Svc,
};
use std::marker::PhantomData;
use tracing::debug;

/// Declares what satisfies an injection point whose values are `Svc<I>`.
/// Created by [`InjectionContext::binding_for`].
pub struct BindingBuilder<'c, I: ?Sized> {
    context: &'c InjectionContext,
    point: InjectionPoint,
    marker: PhantomData<fn() -> Svc<I>>,
}

impl<'c, I: ?Sized + Interface> BindingBuilder<'c, I> {
    pub(crate) fn new(
        context: &'c InjectionContext,
        point: InjectionPoint,
    ) -> Self {
        BindingBuilder {
            context,
            point,
            marker: PhantomData,
        }
    }

    /// The injection point being bound.
    #[must_use]
    pub fn point(&self) -> &InjectionPoint {
        &self.point
    }

    /// Binds the point to `Impl`, which is built by the graph builder each
    /// time the point is resolved. Singleton-scoped implementations are
    /// built once.
    pub fn map<Impl: Service>(self) -> InjectResult<()>
    where
        I: InterfaceFor<Impl>,
    {
        let implementation = ServiceInfo::of::<Impl>();
        debug!(point = %self.point, %implementation, "mapping binding");

        let producer = producer(move |context, request_info| {
            let instance = GraphBuilder::new(context, request_info)
                .build(implementation)?
                .downcast::<Impl>()
                .map_err(|_| InjectError::InvalidProvider {
                    service_info: implementation,
                })?;
            Ok(Box::new(I::from_svc(instance)) as Resolved)
        });
        self.context.add(self.point, producer)
    }

    /// Binds the point to an existing instance.
    pub fn to_instance(self, instance: Svc<I>) -> InjectResult<()> {
        debug!(point = %self.point, "binding instance");

        let producer = producer(move |_, _| {
            Ok(Box::new(Svc::clone(&instance)) as Resolved)
        });
        self.context.add(self.point, producer)
    }
}

/// Declares which provider satisfies requests for `dyn Provider<T>`.
/// Created by [`InjectionContext::provider_binding_for`].
pub struct ProviderBindingBuilder<'c, T: ?Sized> {
    context: &'c InjectionContext,
    point: InjectionPoint,
    marker: PhantomData<fn() -> Svc<T>>,
}

impl<'c, T: ?Sized + Service> ProviderBindingBuilder<'c, T> {
    pub(crate) fn new(
        context: &'c InjectionContext,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        ProviderBindingBuilder {
            context,
            point: InjectionPoint::of::<dyn Provider<T>>(markers),
            marker: PhantomData,
        }
    }

    /// The injection point being bound.
    #[must_use]
    pub fn point(&self) -> &InjectionPoint {
        &self.point
    }

    /// Binds the point to a lazy provider that builds `P` with the graph
    /// builder whenever a value is requested from it, then asks `P` for the
    /// value.
    pub fn map<P: Provider<T>>(self) -> InjectResult<()> {
        debug!(
            point = %self.point,
            provider = %ServiceInfo::of::<P>(),
            "mapping provider binding"
        );

        let producer = producer(|context, _| {
            let provider: Svc<dyn Provider<T>> =
                Svc::new(LazyProvider::<T, P>::new(context.clone()));
            Ok(Box::new(provider) as Resolved)
        });
        self.context.add(self.point, producer)
    }
}
