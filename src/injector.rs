use crate::{
    BindingBuilder, InjectError, InjectResult, InjectionContext,
    InjectionPoint, InjectorBuilder, Interface, Marker, ProviderBindingBuilder,
    RequestInfo, Service, Svc,
};

/// The entry point for building object graphs. An injector resolves
/// injection points through its [`InjectionContext`] and builds the bound
/// implementations on demand.
///
/// ```
/// use graph_injector::{ClassInfo, Constructor, Injector, Svc};
///
/// struct Greeter;
///
/// let mut builder = Injector::builder();
/// builder.register(
///     ClassInfo::builder::<Greeter>()
///         .constructor(Constructor::new(), |_| Ok(Greeter))
///         .build(),
/// );
///
/// let injector = builder.build();
/// injector.binding_for::<Greeter>([]).map::<Greeter>().unwrap();
///
/// let _greeter: Svc<Greeter> = injector.get_instance().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Injector {
    context: InjectionContext,
}

impl Injector {
    /// Creates a builder for an injector.
    #[must_use]
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::default()
    }

    /// Creates an injector over an existing context.
    #[must_use]
    pub fn new(context: InjectionContext) -> Self {
        Injector { context }
    }

    /// The context of this injector.
    #[must_use]
    pub fn context(&self) -> &InjectionContext {
        &self.context
    }

    /// Starts declaring a binding for `I`, qualified by `markers`.
    #[must_use]
    pub fn binding_for<I: ?Sized + Interface>(
        &self,
        markers: impl IntoIterator<Item = Marker>,
    ) -> BindingBuilder<'_, I> {
        self.context.binding_for(markers)
    }

    /// Starts declaring a provider binding for `T`, qualified by `markers`.
    #[must_use]
    pub fn provider_binding_for<T: ?Sized + Service>(
        &self,
        markers: impl IntoIterator<Item = Marker>,
    ) -> ProviderBindingBuilder<'_, T> {
        self.context.provider_binding_for(markers)
    }

    /// Gets an instance of `I` from the unqualified binding for it.
    pub fn get_instance<I: ?Sized + Interface>(&self) -> InjectResult<Svc<I>> {
        self.get_point(&InjectionPoint::of::<I>([]))
    }

    /// Gets an instance of `I` from the binding qualified by `markers`.
    pub fn get_qualified<I: ?Sized + Interface>(
        &self,
        markers: impl IntoIterator<Item = Marker>,
    ) -> InjectResult<Svc<I>> {
        self.get_point(&InjectionPoint::of::<I>(markers))
    }

    /// Gets the value bound to an injection point whose values are `Svc<I>`.
    pub fn get_point<I: ?Sized + Interface>(
        &self,
        point: &InjectionPoint,
    ) -> InjectResult<Svc<I>> {
        self.context
            .resolve(point, &RequestInfo::new())?
            .downcast::<Svc<I>>()
            .map(|instance| *instance)
            .map_err(|_| InjectError::ArgumentMismatch {
                expected: crate::ServiceInfo::of::<I>(),
                point: point.token().clone(),
            })
    }
}
