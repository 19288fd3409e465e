#![allow(clippy::used_underscore_binding)]

use crate::{InjectionPoint, MarkerError, MemberRef, TypeToken};
use derive_more::{Display, Error};
use std::{
    any::{Any, TypeId},
    error::Error as StdError,
    sync::Arc,
};

/// A reference-counted pointer holding a service. Services are shared across
/// threads, so this is always an [`Arc<T>`].
pub type Svc<T> = Arc<T>;

/// A reference-counted service pointer holding an instance of `dyn Any`.
pub type DynSvc = Svc<dyn Any + Send + Sync>;

/// A dependency resolved for an injection point. This always holds a
/// [`Svc<I>`] for the interface `I` requested by the point.
pub type Resolved = Box<dyn Any + Send + Sync>;

/// An error returned by user-supplied constructors and injection methods.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A result from attempting to inject dependencies into a service and
/// construct an instance of it.
pub type InjectResult<T> = Result<T, InjectError>;

/// Implemented automatically on types that are capable of being a service.
pub trait Service: Any + Send + Sync {}
impl<T: ?Sized + Any + Send + Sync> Service for T {}

/// Raw type information about a service. Two [`ServiceInfo`]s are equal iff
/// they describe the same Rust type.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Display)]
#[display(fmt = "{}", name)]
pub struct ServiceInfo {
    id: TypeId,
    name: &'static str,
}

impl ServiceInfo {
    /// Creates a [`ServiceInfo`] for the given type.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        ServiceInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The raw type of an array whose component type is generic. Every
    /// generic array erases to this type, regardless of its component.
    #[must_use]
    pub fn erased_array() -> Self {
        ServiceInfo::of::<[Box<dyn Any + Send + Sync>]>()
    }

    /// Gets the [`TypeId`] for this service.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Gets the type name of this service.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the module path this type was declared in, e.g. `my_app::cars`
    /// for `my_app::cars::Car<T>`.
    #[must_use]
    pub fn package(&self) -> &'static str {
        let path = self.name.split('<').next().unwrap_or(self.name);
        match path.rfind("::") {
            Some(index) => &path[..index],
            None => "",
        }
    }
}

/// A misuse of the declaration API, such as capturing a type token from a
/// class that does not subclass the token type.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[non_exhaustive]
pub enum UsageError {
    /// The class does not subclass the required base type.
    #[display(fmt = "{} must subclass {}", class, base)]
    NotSubclassed {
        /// The class being inspected.
        class: ServiceInfo,
        /// The base type it was expected to subclass.
        base: ServiceInfo,
    },

    /// The class subclasses the base type without supplying a type argument.
    #[display(fmt = "{} is missing a type parameter", class)]
    MissingTypeParameter {
        /// The direct subclass of the base type.
        class: ServiceInfo,
    },

    /// A class on the supertype chain has no registered metadata.
    #[display(fmt = "no class metadata is registered for {}", class)]
    UnknownClass {
        /// The unregistered class.
        class: ServiceInfo,
    },

    /// The type argument of a marker literal is not a registered marker kind.
    #[display(fmt = "{} is not a registered marker kind", kind)]
    UnknownMarkerKind {
        /// The type argument that was found.
        kind: ServiceInfo,
    },

    /// A strict marker literal does not implement its own declared kind.
    #[display(fmt = "{} does not implement its marker kind {}", literal, kind)]
    StrictKindMismatch {
        /// The type name of the literal.
        literal: &'static str,
        /// The kind declared by the literal.
        kind: ServiceInfo,
    },

    /// The supertype chain loops back on itself.
    #[display(fmt = "the supertype chain of {} is cyclic", class)]
    CyclicHierarchy {
        /// The class whose chain was being walked.
        class: ServiceInfo,
    },
}

/// An error that has occurred during creation of a service.
#[derive(Debug, Display)]
#[display(fmt = "an error occurred during injection: {}")]
#[non_exhaustive]
pub enum InjectError {
    /// No binding is registered for the requested injection point.
    #[display(fmt = "no binding is registered for {}", point)]
    UnresolvedBinding {
        /// The point that was requested.
        point: InjectionPoint,
    },

    /// A binding for the injection point was already declared.
    #[display(fmt = "a binding for {} was already declared", point)]
    DuplicateBinding {
        /// The point that was declared twice.
        point: InjectionPoint,
    },

    /// The type declares neither an injection constructor nor a
    /// zero-parameter constructor.
    #[display(fmt = "{} has no injectable constructor", service_info)]
    NoInjectableConstructor {
        /// The service that was requested.
        service_info: ServiceInfo,
    },

    /// A qualifier of an injection point has members that cannot be read,
    /// so the point cannot be used as a lookup key.
    #[display(fmt = "{} has a malformed qualifier: {}", point, source)]
    MalformedMarker {
        /// The point carrying the qualifier.
        point: InjectionPoint,
        /// Why the qualifier could not be read.
        source: MarkerError,
    },

    /// The introspection capability has no metadata for a type.
    #[display(fmt = "no class metadata is registered for {}", service_info)]
    MissingClass {
        /// The type without metadata.
        service_info: ServiceInfo,
    },

    /// A class cannot be projected onto its supertype.
    #[display(fmt = "{} cannot be projected onto {}", service_info, supertype)]
    MissingUpcast {
        /// The derived class.
        service_info: ServiceInfo,
        /// The supertype that could not be reached.
        supertype: ServiceInfo,
    },

    /// A cycle was detected during activation of a service.
    #[display(
        fmt = "a cycle was detected during activation of {} [{}]",
        service_info,
        "fmt_cycle(cycle)"
    )]
    CycleDetected {
        /// The service that was requested.
        service_info: ServiceInfo,
        /// The chain of services that were requested during resolution of
        /// this service.
        cycle: Vec<ServiceInfo>,
    },

    /// A dependency of a member could not be resolved.
    #[display(fmt = "failed to resolve a dependency of {}", member)]
    DependencyFailed {
        /// The member whose dependency failed.
        member: MemberRef,
        /// Why the dependency failed.
        source: Box<InjectError>,
    },

    /// Invoking a constructor or method, or setting a field, failed.
    #[display(fmt = "{} failed", member)]
    ConstructionFailed {
        /// The member that failed.
        member: MemberRef,
        /// The error raised by the member.
        source: BoxError,
    },

    /// The introspection capability refused access to a member.
    #[display(fmt = "access to {} was denied", member)]
    AccessDenied {
        /// The member that could not be made accessible.
        member: MemberRef,
    },

    /// A built instance was not of the type its binding declared.
    #[display(
        fmt = "the instance built for {} has the wrong type",
        service_info
    )]
    InvalidProvider {
        /// The implementation that was built.
        service_info: ServiceInfo,
    },

    /// A resolved value does not have the type the receiver asked for.
    #[display(
        fmt = "the value resolved for {} is not a pointer to {}",
        point,
        expected
    )]
    ArgumentMismatch {
        /// The type the receiver asked for.
        expected: ServiceInfo,
        /// The token of the point that was resolved.
        point: TypeToken,
    },

    /// A receiver asked for more arguments than were declared.
    #[display(fmt = "missing an argument of type {}", expected)]
    MissingArgument {
        /// The type the receiver asked for.
        expected: ServiceInfo,
    },

    /// The declaration API was misused.
    #[display(fmt = "{}", _0)]
    Usage(UsageError),

    /// An unexpected error has occurred. This is usually caused by
    /// inconsistent class metadata.
    #[display(fmt = "an unexpected error occurred: {}", _0)]
    InternalError(String),
}

impl InjectError {
    /// Follows wrapped dependency and construction failures down to the
    /// error that started them.
    #[must_use]
    pub fn root_cause(&self) -> &InjectError {
        let mut current = self;
        loop {
            current = match current {
                InjectError::DependencyFailed { source, .. } => &**source,
                InjectError::ConstructionFailed { source, .. } => {
                    match source.downcast_ref::<InjectError>() {
                        Some(inner) => inner,
                        None => return current,
                    }
                }
                _ => return current,
            };
        }
    }
}

impl StdError for InjectError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            InjectError::DependencyFailed { source, .. } => {
                Some(source.as_ref() as &(dyn StdError + 'static))
            }
            InjectError::ConstructionFailed { source, .. } => {
                Some(source.as_ref() as &(dyn StdError + 'static))
            }
            InjectError::MalformedMarker { source, .. } => Some(source),
            InjectError::Usage(error) => Some(error),
            _ => None,
        }
    }
}

impl From<UsageError> for InjectError {
    fn from(error: UsageError) -> Self {
        InjectError::Usage(error)
    }
}

fn fmt_cycle(cycle: &[ServiceInfo]) -> String {
    let mut joined = String::new();
    for item in cycle {
        if !joined.is_empty() {
            joined.push_str(" -> ");
        }
        joined.push_str(item.name());
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cars {
        pub struct Car<T>(pub T);
    }

    #[test]
    fn package_strips_type_name_and_generics() {
        let info = ServiceInfo::of::<cars::Car<std::vec::Vec<u8>>>();
        assert!(info.package().ends_with("tests::cars"));
        assert_eq!("", ServiceInfo::of::<u8>().package());
    }

    #[test]
    fn root_cause_unwraps_nested_failures() {
        let unresolved = InjectError::UnresolvedBinding {
            point: InjectionPoint::of::<u8>([]),
        };
        let member = MemberRef::constructor(ServiceInfo::of::<u16>());
        let wrapped = InjectError::ConstructionFailed {
            member: member.clone(),
            source: Box::new(InjectError::DependencyFailed {
                member,
                source: Box::new(unresolved),
            }),
        };

        assert!(matches!(
            wrapped.root_cause(),
            InjectError::UnresolvedBinding { .. }
        ));
        assert!(wrapped.source().is_some());
    }

    #[test]
    fn cycle_is_formatted_in_request_order() {
        let error = InjectError::CycleDetected {
            service_info: ServiceInfo::of::<u8>(),
            cycle: vec![ServiceInfo::of::<u8>(), ServiceInfo::of::<u16>()],
        };
        assert!(error.to_string().ends_with("[u8 -> u16]"));
    }
}
