use crate::{
    Args, BoxError, Constructor, ConstructorInfo, Field, FieldInfo,
    InjectError, InjectResult, Interface, MemberKind, MemberRef, Method,
    MethodInfo, Resolved, Service, ServiceInfo, Svc, TypeDescriptor,
};
use std::{any::Any, fmt::Debug, marker::PhantomData};

/// How instances of a class are shared.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Scope {
    /// A new instance is built for every request.
    #[default]
    Prototype,
    /// A single instance is built per injection context and shared.
    Singleton,
}

type UpcastFn = dyn for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any>
    + Send
    + Sync;

/// Projects an instance of a class onto the part of it that belongs to its
/// supertype.
#[derive(Clone)]
pub struct Upcast(Svc<UpcastFn>);

impl Upcast {
    /// Creates a projection from a function.
    pub fn new<F>(project: F) -> Self
    where
        F: for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any>
            + Send
            + Sync
            + 'static,
    {
        Upcast(Svc::new(project))
    }

    /// Projects an instance. Returns `None` if the instance is not of the
    /// class this projection was created for.
    pub fn apply<'a>(
        &self,
        instance: &'a mut dyn Any,
    ) -> Option<&'a mut dyn Any> {
        (self.0)(instance)
    }
}

impl Debug for Upcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Upcast")
    }
}

/// The declared supertype of a class.
#[derive(Clone, Debug)]
pub struct Supertype {
    service_info: ServiceInfo,
    arguments: Vec<TypeDescriptor>,
    upcast: Option<Upcast>,
}

impl Supertype {
    /// The raw supertype.
    #[must_use]
    pub fn service_info(&self) -> ServiceInfo {
        self.service_info
    }

    /// The type arguments passed to the supertype.
    #[must_use]
    pub fn arguments(&self) -> &[TypeDescriptor] {
        &self.arguments
    }

    /// The projection from the class onto this supertype, if one was
    /// declared.
    #[must_use]
    pub fn upcast(&self) -> Option<&Upcast> {
        self.upcast.as_ref()
    }
}

/// Metadata about a class: its scope, supertype and declared members.
#[derive(Clone)]
pub struct ClassInfo {
    service_info: ServiceInfo,
    package: &'static str,
    scope: Scope,
    supertype: Option<Supertype>,
    constructors: Vec<ConstructorInfo>,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
}

impl ClassInfo {
    /// Starts describing a class.
    #[must_use]
    pub fn builder<C: Service>() -> ClassBuilder<C> {
        let service_info = ServiceInfo::of::<C>();
        ClassBuilder {
            class: ClassInfo {
                service_info,
                package: service_info.package(),
                scope: Scope::Prototype,
                supertype: None,
                constructors: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
            },
            marker: PhantomData,
        }
    }

    /// The class being described.
    #[must_use]
    pub fn service_info(&self) -> ServiceInfo {
        self.service_info
    }

    /// The package the class was declared in.
    #[must_use]
    pub fn package(&self) -> &'static str {
        self.package
    }

    /// The scope of the class.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The declared supertype.
    #[must_use]
    pub fn supertype(&self) -> Option<&Supertype> {
        self.supertype.as_ref()
    }

    /// The declared constructors.
    #[must_use]
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// The declared fields.
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// The declared methods.
    #[must_use]
    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// The constructor to build instances with: the first one marked for
    /// injection, or else the one without parameters.
    #[must_use]
    pub fn injectable_constructor(&self) -> Option<&ConstructorInfo> {
        self.constructors
            .iter()
            .find(|constructor| constructor.is_inject())
            .or_else(|| {
                self.constructors
                    .iter()
                    .find(|constructor| constructor.parameters().is_empty())
            })
    }
}

impl Debug for ClassInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassInfo")
            .field("service_info", &self.service_info)
            .field("scope", &self.scope)
            .field("supertype", &self.supertype)
            .field("constructors", &self.constructors.len())
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Builds the [`ClassInfo`] of `C`.
///
/// ```
/// use graph_injector::{
///     ClassInfo, Constructor, Field, Method, Scope, Svc, Visibility,
/// };
///
/// #[derive(Default)]
/// struct Vehicle {
///     wheels: Option<Svc<u8>>,
/// }
///
/// #[derive(Default)]
/// struct Truck {
///     vehicle: Vehicle,
///     started: bool,
/// }
///
/// let truck = ClassInfo::builder::<Truck>()
///     .singleton()
///     .extends(|truck: &mut Truck| &mut truck.vehicle)
///     .constructor(Constructor::new(), |_| Ok(Truck::default()))
///     .method(
///         Method::new("start").inject().visibility(Visibility::Private),
///         |truck, _| {
///             truck.started = true;
///             Ok(())
///         },
///     )
///     .build();
///
/// let vehicle = ClassInfo::builder::<Vehicle>()
///     .field(Field::<u8>::new("wheels").inject(), |vehicle, wheels| {
///         vehicle.wheels = Some(wheels)
///     })
///     .build();
///
/// assert_eq!(Scope::Singleton, truck.scope());
/// assert!(truck.injectable_constructor().is_some());
/// assert!(vehicle.injectable_constructor().is_none());
/// ```
pub struct ClassBuilder<C> {
    class: ClassInfo,
    marker: PhantomData<fn() -> C>,
}

impl<C: Service> ClassBuilder<C> {
    /// Overrides the package the class was declared in.
    #[must_use]
    pub fn package(mut self, package: &'static str) -> Self {
        self.class.package = package;
        self
    }

    /// Sets the scope of the class.
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.class.scope = scope;
        self
    }

    /// Makes the class singleton-scoped.
    #[must_use]
    pub fn singleton(self) -> Self {
        self.scope(Scope::Singleton)
    }

    /// Declares `B` as the supertype of the class. Instances of `C` embed
    /// their `B` part, which `project` returns.
    #[must_use]
    pub fn extends<B, P>(self, project: P) -> Self
    where
        B: Service,
        P: Fn(&mut C) -> &mut B + Send + Sync + 'static,
    {
        let upcast = Upcast::new(move |instance: &mut dyn Any| {
            instance
                .downcast_mut::<C>()
                .map(|instance| project(instance) as &mut dyn Any)
        });
        self.with_supertype(ServiceInfo::of::<B>(), Vec::new(), Some(upcast))
    }

    /// Declares a supertype that instances cannot be projected onto, passing
    /// it type arguments. This is how classes capture type tokens and marker
    /// kinds.
    #[must_use]
    pub fn supertype(
        self,
        raw: ServiceInfo,
        arguments: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Self {
        self.with_supertype(raw, arguments.into_iter().collect(), None)
    }

    fn with_supertype(
        mut self,
        service_info: ServiceInfo,
        arguments: Vec<TypeDescriptor>,
        upcast: Option<Upcast>,
    ) -> Self {
        self.class.supertype = Some(Supertype {
            service_info,
            arguments,
            upcast,
        });
        self
    }

    /// Declares a constructor.
    #[must_use]
    pub fn constructor<F>(mut self, declaration: Constructor, invoke: F) -> Self
    where
        F: Fn(Args) -> Result<C, BoxError> + Send + Sync + 'static,
    {
        self.class.constructors.push(ConstructorInfo {
            declaring: self.class.service_info,
            declaration,
            invoke: Svc::new(move |args: Args| {
                invoke(args).map(|instance| {
                    Box::new(instance) as Box<dyn Any + Send + Sync>
                })
            }),
        });
        self
    }

    /// Declares a field holding a `Svc<I>`.
    #[must_use]
    pub fn field<I, F>(mut self, declaration: Field<I>, set: F) -> Self
    where
        I: ?Sized + Interface,
        F: Fn(&mut C, Svc<I>) + Send + Sync + 'static,
    {
        let member = MemberRef::new(
            self.class.service_info,
            MemberKind::Field,
            declaration.name,
        );
        let point = declaration.token.clone();
        let setter = move |instance: &mut dyn Any, value: Resolved| {
            let value = value.downcast::<Svc<I>>().map_err(|_| {
                InjectError::ArgumentMismatch {
                    expected: ServiceInfo::of::<I>(),
                    point: point.clone(),
                }
            });
            downcast_instance::<C>(instance, &member)
                .and_then(|instance| value.map(|value| set(instance, *value)))
        };

        self.class.fields.push(FieldInfo {
            declaring: self.class.service_info,
            name: declaration.name,
            token: declaration.token,
            markers: declaration.markers,
            visibility: declaration.visibility,
            is_final: declaration.is_final,
            is_static: declaration.is_static,
            set: Svc::new(setter),
        });
        self
    }

    /// Declares a method.
    #[must_use]
    pub fn method<F>(mut self, declaration: Method, invoke: F) -> Self
    where
        F: Fn(&mut C, Args) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let member = MemberRef::new(
            self.class.service_info,
            MemberKind::Method,
            declaration.name,
        );
        let invoker = move |instance: &mut dyn Any, args: Args| {
            match downcast_instance::<C>(instance, &member) {
                Ok(instance) => invoke(instance, args),
                Err(error) => Err(error.into()),
            }
        };

        self.class.methods.push(MethodInfo {
            declaring: self.class.service_info,
            declaration,
            invoke: Svc::new(invoker),
        });
        self
    }

    /// Finishes describing the class.
    #[must_use]
    pub fn build(self) -> ClassInfo {
        self.class
    }
}

fn downcast_instance<'a, C: Service>(
    instance: &'a mut dyn Any,
    member: &MemberRef,
) -> InjectResult<&'a mut C> {
    instance.downcast_mut::<C>().ok_or_else(|| {
        InjectError::InternalError(format!(
            "{} was applied to an instance of another type",
            member
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Base {
        value: u8,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
    }

    #[test]
    fn upcast_projects_embedded_base() {
        let class = ClassInfo::builder::<Derived>()
            .extends(|derived: &mut Derived| &mut derived.base)
            .build();
        let upcast = class.supertype().and_then(Supertype::upcast).unwrap();

        let mut derived = Derived::default();
        let base = upcast.apply(&mut derived).unwrap();
        base.downcast_mut::<Base>().unwrap().value = 7;
        assert_eq!(7, derived.base.value);

        let mut other = 0u8;
        assert!(upcast.apply(&mut other).is_none());
    }

    #[test]
    fn inject_constructor_is_preferred() {
        let class = ClassInfo::builder::<Base>()
            .constructor(Constructor::new(), |_| Ok(Base::default()))
            .constructor(Constructor::new().inject().param::<u8>(), |mut args| {
                Ok(Base {
                    value: *args.take::<u8>()?,
                })
            })
            .build();

        let constructor = class.injectable_constructor().unwrap();
        assert!(constructor.is_inject());
        assert_eq!(1, constructor.parameters().len());
    }

    #[test]
    fn zero_parameter_constructor_is_fallback() {
        let class = ClassInfo::builder::<Base>()
            .constructor(Constructor::new().param::<u8>(), |mut args| {
                Ok(Base {
                    value: *args.take::<u8>()?,
                })
            })
            .constructor(Constructor::new(), |_| Ok(Base::default()))
            .build();

        let constructor = class.injectable_constructor().unwrap();
        assert!(!constructor.is_inject());
        assert!(constructor.parameters().is_empty());
    }
}
