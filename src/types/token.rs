use crate::{
    introspect::direct_subclass_of, Introspect, ServiceInfo, TypeDescriptor,
    UsageError,
};
use derive_more::Display;
use std::any::Any;

/// A runtime stand-in for a possibly parameterized type, usable as a lookup
/// key. Two tokens are equal iff both their descriptors and their raw types
/// are equal.
///
/// ```
/// use graph_injector::TypeToken;
///
/// assert_eq!(TypeToken::of::<Vec<String>>(), TypeToken::of::<Vec<String>>());
/// assert_ne!(TypeToken::of::<Vec<String>>(), TypeToken::of::<Vec<i32>>());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[display(fmt = "{}", descriptor)]
pub struct TypeToken {
    descriptor: TypeDescriptor,
    raw_type: Option<ServiceInfo>,
}

impl TypeToken {
    /// Creates a token for a Rust type.
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        TypeToken::from_descriptor(TypeDescriptor::of::<T>())
    }

    /// Creates a token for an explicit type shape.
    #[must_use]
    pub fn from_descriptor(descriptor: TypeDescriptor) -> Self {
        let raw_type = descriptor.raw_type();
        TypeToken {
            descriptor,
            raw_type,
        }
    }

    /// Captures the type argument a registered class passes to
    /// [`TypeToken`] when it declares it as its supertype, possibly through
    /// intermediate classes.
    ///
    /// ```
    /// use graph_injector::{
    ///     ClassInfo, ClassRegistry, ServiceInfo, TypeDescriptor, TypeToken,
    /// };
    ///
    /// struct List;
    /// struct StringList;
    ///
    /// let shape = TypeDescriptor::parameterized(
    ///     ServiceInfo::of::<List>(),
    ///     [TypeDescriptor::of::<String>()],
    /// );
    ///
    /// let mut classes = ClassRegistry::new();
    /// classes.register(
    ///     ClassInfo::builder::<StringList>()
    ///         .supertype(ServiceInfo::of::<TypeToken>(), [shape.clone()])
    ///         .build(),
    /// );
    ///
    /// let token =
    ///     TypeToken::capture(&classes, ServiceInfo::of::<StringList>()).unwrap();
    /// assert_eq!(TypeToken::from_descriptor(shape), token);
    /// ```
    pub fn capture(
        introspect: &dyn Introspect,
        class: ServiceInfo,
    ) -> Result<Self, UsageError> {
        let subclass = direct_subclass_of(
            introspect,
            class,
            ServiceInfo::of::<TypeToken>(),
        )?;
        let argument = subclass
            .supertype()
            .and_then(|supertype| supertype.arguments().first())
            .ok_or(UsageError::MissingTypeParameter {
                class: subclass.service_info(),
            })?;

        Ok(TypeToken::from_descriptor(argument.clone()))
    }

    /// The fully parameterized shape of this type.
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The raw identity of this type, if one can be determined.
    #[must_use]
    pub fn raw_type(&self) -> Option<ServiceInfo> {
        self.raw_type
    }

    /// The type arguments of a parameterized type, or nothing otherwise.
    #[must_use]
    pub fn parameter_types(&self) -> &[TypeDescriptor] {
        self.descriptor.arguments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassInfo, ClassRegistry};

    struct List;
    struct Holder;
    struct StringList;
    struct NamedStringList;
    struct Unrelated;
    struct Bare;

    fn string_list() -> TypeDescriptor {
        TypeDescriptor::parameterized(
            ServiceInfo::of::<List>(),
            [TypeDescriptor::of::<String>()],
        )
    }

    fn registry() -> ClassRegistry {
        let mut classes = ClassRegistry::new();
        classes.register(
            ClassInfo::builder::<StringList>()
                .supertype(ServiceInfo::of::<TypeToken>(), [string_list()])
                .build(),
        );
        classes.register(
            ClassInfo::builder::<NamedStringList>()
                .supertype(ServiceInfo::of::<StringList>(), [])
                .build(),
        );
        classes.register(ClassInfo::builder::<Unrelated>().build());
        classes.register(
            ClassInfo::builder::<Bare>()
                .supertype(ServiceInfo::of::<TypeToken>(), [])
                .build(),
        );
        classes
    }

    #[test]
    fn tokens_for_same_shape_are_equal() {
        assert_eq!(TypeToken::of::<Holder>(), TypeToken::of::<Holder>());
        assert_eq!(
            TypeToken::from_descriptor(string_list()),
            TypeToken::from_descriptor(string_list())
        );
        assert_ne!(
            TypeToken::of::<Vec<String>>(),
            TypeToken::of::<Vec<i32>>()
        );
    }

    #[test]
    fn parameterizations_of_same_raw_type_are_distinct() {
        let integers = TypeToken::from_descriptor(TypeDescriptor::parameterized(
            ServiceInfo::of::<List>(),
            [TypeDescriptor::of::<i32>()],
        ));
        let strings = TypeToken::from_descriptor(string_list());

        assert_eq!(integers.raw_type(), strings.raw_type());
        assert_ne!(integers, strings);
        assert_eq!(&[TypeDescriptor::of::<String>()], strings.parameter_types());
    }

    #[test]
    fn wildcard_has_no_raw_type() {
        let token = TypeToken::from_descriptor(TypeDescriptor::wildcard());
        assert_eq!(None, token.raw_type());
        assert_eq!("?", token.to_string());
    }

    #[test]
    fn capture_reads_direct_subclass_argument() {
        let classes = registry();
        let direct =
            TypeToken::capture(&classes, ServiceInfo::of::<StringList>());
        let indirect =
            TypeToken::capture(&classes, ServiceInfo::of::<NamedStringList>());

        let expected = TypeToken::from_descriptor(string_list());
        assert_eq!(Ok(expected.clone()), direct);
        assert_eq!(Ok(expected), indirect);
    }

    #[test]
    fn capture_without_subclassing_fails() {
        let classes = registry();
        match TypeToken::capture(&classes, ServiceInfo::of::<Unrelated>()) {
            Err(UsageError::NotSubclassed { class, base })
                if class == ServiceInfo::of::<Unrelated>()
                    && base == ServiceInfo::of::<TypeToken>() => {}
            result => panic!("unexpected result: {:?}", result),
        }
    }

    #[test]
    fn capture_without_argument_fails() {
        let classes = registry();
        assert_eq!(
            Err(UsageError::MissingTypeParameter {
                class: ServiceInfo::of::<Bare>()
            }),
            TypeToken::capture(&classes, ServiceInfo::of::<Bare>())
        );
    }

    #[test]
    fn capture_of_unknown_class_fails() {
        let classes = registry();
        assert_eq!(
            Err(UsageError::UnknownClass {
                class: ServiceInfo::of::<Holder>()
            }),
            TypeToken::capture(&classes, ServiceInfo::of::<Holder>())
        );
    }
}
