use crate::{
    GraphBuilder, InjectError, InjectResult, InjectionContext, Interface,
    RequestInfo, Service, ServiceInfo, Svc,
};
use std::marker::PhantomData;

/// Provides instances of a service on demand. A provider can be bound with
/// [`InjectionContext::provider_binding_for`], after which requests for
/// `dyn Provider<T>` receive a lazy provider that builds the bound provider
/// type each time [`Provider::get`] is called.
///
/// ```
/// use graph_injector::{
///     ClassInfo, Constructor, InjectResult, Injector, Provider, Svc,
/// };
///
/// struct Greeting(String);
///
/// #[derive(Default)]
/// struct GreetingProvider;
///
/// impl Provider<Greeting> for GreetingProvider {
///     fn get(&self) -> InjectResult<Svc<Greeting>> {
///         Ok(Svc::new(Greeting("hello".to_owned())))
///     }
/// }
///
/// let mut builder = Injector::builder();
/// builder.register(
///     ClassInfo::builder::<GreetingProvider>()
///         .constructor(Constructor::new(), |_| Ok(GreetingProvider))
///         .build(),
/// );
///
/// let injector = builder.build();
/// injector
///     .provider_binding_for::<Greeting>([])
///     .map::<GreetingProvider>()
///     .unwrap();
///
/// let provider: Svc<dyn Provider<Greeting>> = injector.get_instance().unwrap();
/// assert_eq!("hello", provider.get().unwrap().0);
/// ```
pub trait Provider<T: ?Sized + Service>: Service {
    /// Provides an instance of the service.
    fn get(&self) -> InjectResult<Svc<T>>;
}

impl<T: ?Sized + Service> Interface for dyn Provider<T> {}

/// A provider that builds the provider type `P` through the graph builder
/// each time it is asked for a value, then delegates to it.
pub(crate) struct LazyProvider<T: ?Sized, P> {
    context: InjectionContext,
    marker: PhantomData<fn() -> (Svc<T>, P)>,
}

impl<T: ?Sized, P> LazyProvider<T, P> {
    pub(crate) fn new(context: InjectionContext) -> Self {
        LazyProvider {
            context,
            marker: PhantomData,
        }
    }
}

impl<T, P> Provider<T> for LazyProvider<T, P>
where
    T: ?Sized + Service,
    P: Provider<T>,
{
    fn get(&self) -> InjectResult<Svc<T>> {
        let service_info = ServiceInfo::of::<P>();
        let provider = GraphBuilder::new(&self.context, &RequestInfo::new())
            .build(service_info)?
            .downcast::<P>()
            .map_err(|_| InjectError::InvalidProvider { service_info })?;
        provider.get()
    }
}
