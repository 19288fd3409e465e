use crate::{Service, Svc};

/// Indicates that a type can be requested from the injector. Each sized
/// service type is an interface for itself, while each `dyn Trait` must be
/// declared explicitly with the [`interface!`] macro before it can be bound.
pub trait Interface: Service {}
impl<T: Service> Interface for T {}

/// Marker trait that indicates that a type is an interface for another type.
/// Each sized type is an interface for itself, and each `dyn Trait` is an
/// interface for the types listed in its [`interface!`] declaration. This is
/// what lets a binding coerce the instance it built into the pointer type
/// requested by the injection point.
pub trait InterfaceFor<T: Service>: Interface {
    /// Coerces a pointer to the implementation into a pointer to this
    /// interface.
    fn from_svc(service: Svc<T>) -> Svc<Self>;
}

impl<T: Service> InterfaceFor<T> for T {
    fn from_svc(service: Svc<T>) -> Svc<Self> {
        service
    }
}

/// Marks a trait as being an interface for many other types. This means that
/// a binding for the given trait can map to any of the types indicated by
/// this macro invocation.
///
/// The trait must be a subtrait of [`Service`] so that pointers to it can be
/// shared across threads.
///
/// ## Example
///
/// ```
/// use graph_injector::{interface, Service};
///
/// struct Bar;
/// #[cfg(test)]
/// struct MockBar;
///
/// trait Foo: Service {}
/// impl Foo for Bar {}
/// #[cfg(test)]
/// impl Foo for MockBar {}
///
/// // Bindings for `dyn Foo` can map to either `Bar` or, in a test run,
/// // `MockBar`. Note that attributes are allowed on each of the listed types.
/// interface!(
///     Foo = [
///         Bar,
///         #[cfg(test)]
///         MockBar,
///     ]
/// );
/// ```
#[macro_export]
macro_rules! interface {
    ($trait:tt = [$($(#[$attr:meta])* $impl:ty),* $(,)?]) => {
        impl $crate::Interface for dyn $trait {}

        $(
            $(#[$attr])*
            impl $crate::InterfaceFor<$impl> for dyn $trait {
                fn from_svc(service: $crate::Svc<$impl>) -> $crate::Svc<Self> {
                    service
                }
            }
        )*
    };
}
