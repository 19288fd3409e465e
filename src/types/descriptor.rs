use crate::ServiceInfo;
use std::{
    any::Any,
    fmt::{Display, Formatter},
};

/// The shape of a possibly parameterized type.
///
/// Rust generics are reified, so `TypeDescriptor::of::<Vec<String>>()` is
/// already distinct from `TypeDescriptor::of::<Vec<i32>>()`. The other shapes
/// describe generic types structurally, with the raw type acting as the
/// identity of the generic family:
///
/// ```
/// use graph_injector::{ServiceInfo, TypeDescriptor};
///
/// struct List;
///
/// let strings = TypeDescriptor::parameterized(
///     ServiceInfo::of::<List>(),
///     [TypeDescriptor::of::<String>()],
/// );
/// assert_eq!(Some(ServiceInfo::of::<List>()), strings.raw_type());
/// assert_eq!(&[TypeDescriptor::of::<String>()], strings.arguments());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TypeDescriptor {
    /// A plain type.
    Type(ServiceInfo),

    /// A generic type applied to type arguments, e.g. `List<String>`.
    Parameterized {
        /// The generic family.
        raw: ServiceInfo,
        /// The type arguments, in declaration order.
        arguments: Vec<TypeDescriptor>,
    },

    /// An array whose component type is generic, e.g. `T[]`.
    GenericArray(Box<TypeDescriptor>),

    /// A wildcard type argument, e.g. `? extends Number`.
    Wildcard {
        /// Upper bounds of the wildcard.
        upper: Vec<TypeDescriptor>,
        /// Lower bounds of the wildcard.
        lower: Vec<TypeDescriptor>,
    },
}

impl TypeDescriptor {
    /// Describes a plain type.
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        TypeDescriptor::Type(ServiceInfo::of::<T>())
    }

    /// Describes a generic family applied to type arguments.
    #[must_use]
    pub fn parameterized(
        raw: ServiceInfo,
        arguments: impl IntoIterator<Item = TypeDescriptor>,
    ) -> Self {
        TypeDescriptor::Parameterized {
            raw,
            arguments: arguments.into_iter().collect(),
        }
    }

    /// Describes an array of a generic component type.
    #[must_use]
    pub fn generic_array(component: TypeDescriptor) -> Self {
        TypeDescriptor::GenericArray(Box::new(component))
    }

    /// Describes an unbounded wildcard (`?`).
    #[must_use]
    pub fn wildcard() -> Self {
        TypeDescriptor::Wildcard {
            upper: Vec::new(),
            lower: Vec::new(),
        }
    }

    /// Describes a wildcard with an upper bound (`? extends bound`).
    #[must_use]
    pub fn extends(bound: TypeDescriptor) -> Self {
        TypeDescriptor::Wildcard {
            upper: vec![bound],
            lower: Vec::new(),
        }
    }

    /// Describes a wildcard with a lower bound (`? super bound`).
    #[must_use]
    pub fn super_of(bound: TypeDescriptor) -> Self {
        TypeDescriptor::Wildcard {
            upper: Vec::new(),
            lower: vec![bound],
        }
    }

    /// Gets the raw type of this shape. Wildcards have no determinable raw
    /// type, so `None` is returned for them.
    #[must_use]
    pub fn raw_type(&self) -> Option<ServiceInfo> {
        match self {
            TypeDescriptor::Type(raw)
            | TypeDescriptor::Parameterized { raw, .. } => Some(*raw),
            TypeDescriptor::GenericArray(_) => {
                Some(ServiceInfo::erased_array())
            }
            TypeDescriptor::Wildcard { .. } => None,
        }
    }

    /// Gets the type arguments of a parameterized type. Other shapes have no
    /// arguments.
    #[must_use]
    pub fn arguments(&self) -> &[TypeDescriptor] {
        match self {
            TypeDescriptor::Parameterized { arguments, .. } => arguments,
            _ => &[],
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDescriptor::Type(raw) => write!(f, "{}", raw),
            TypeDescriptor::Parameterized { raw, arguments } => {
                write!(f, "{}<", raw)?;
                fmt_joined(f, arguments, ", ")?;
                write!(f, ">")
            }
            TypeDescriptor::GenericArray(component) => {
                write!(f, "{}[]", component)
            }
            TypeDescriptor::Wildcard { upper, lower } => {
                write!(f, "?")?;
                if !upper.is_empty() {
                    write!(f, " extends ")?;
                    fmt_joined(f, upper, " & ")?;
                }
                if !lower.is_empty() {
                    write!(f, " super ")?;
                    fmt_joined(f, lower, " & ")?;
                }
                Ok(())
            }
        }
    }
}

fn fmt_joined(
    f: &mut Formatter<'_>,
    items: &[TypeDescriptor],
    separator: &str,
) -> std::fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct List;

    #[test]
    fn raw_type_of_each_shape() {
        let list = ServiceInfo::of::<List>();
        let strings =
            TypeDescriptor::parameterized(list, [TypeDescriptor::of::<String>()]);

        assert_eq!(
            Some(ServiceInfo::of::<u8>()),
            TypeDescriptor::of::<u8>().raw_type()
        );
        assert_eq!(Some(list), strings.raw_type());
        assert_eq!(
            Some(ServiceInfo::erased_array()),
            TypeDescriptor::generic_array(strings).raw_type()
        );
        assert_eq!(None, TypeDescriptor::wildcard().raw_type());
    }

    #[test]
    fn display_matches_declared_shape() {
        let list = ServiceInfo::of::<u8>();
        let descriptor = TypeDescriptor::parameterized(
            list,
            [TypeDescriptor::extends(TypeDescriptor::of::<u16>())],
        );
        assert_eq!("u8<? extends u16>", descriptor.to_string());
        assert_eq!(
            "u8[]",
            TypeDescriptor::generic_array(TypeDescriptor::of::<u8>())
                .to_string()
        );
    }
}
