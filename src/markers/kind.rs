use crate::{markers::hash::string_hash, MemberValue, Service, ServiceInfo};
use std::fmt::Debug;

/// A kind of marker. Kinds are usually declared with the [`marker!`] macro,
/// which derives the member list and member accessor from the fields of a
/// struct.
///
/// [`marker!`]: crate::marker
pub trait MarkerKind: Service + Clone + Debug {
    /// Whether markers of this kind take part in binding lookup. Markers of
    /// non-qualifier kinds are dropped from injection points.
    const QUALIFIER: bool = false;

    /// The names of the declared members of this kind, in declaration order.
    const MEMBERS: &'static [&'static str] = &[];

    /// Reads a declared member.
    fn member(&self, name: &str) -> Option<MemberValue> {
        let _ = name;
        None
    }
}

/// Type-erased description of a [`MarkerKind`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct KindInfo {
    service_info: ServiceInfo,
    qualifier: bool,
    members: &'static [&'static str],
}

impl KindInfo {
    /// Describes a marker kind.
    #[must_use]
    pub fn of<K: MarkerKind>() -> Self {
        KindInfo {
            service_info: ServiceInfo::of::<K>(),
            qualifier: K::QUALIFIER,
            members: K::MEMBERS,
        }
    }

    /// The type of the kind.
    #[must_use]
    pub fn service_info(&self) -> ServiceInfo {
        self.service_info
    }

    /// Whether markers of this kind are qualifiers.
    #[must_use]
    pub fn is_qualifier(&self) -> bool {
        self.qualifier
    }

    /// The declared member names of this kind.
    #[must_use]
    pub fn members(&self) -> &'static [&'static str] {
        self.members
    }

    pub(crate) fn hash_code(&self) -> i32 {
        string_hash(self.service_info.name())
    }
}

/// Something that member values of a marker can be read from.
pub trait MemberSource: Send + Sync + Debug {
    /// The marker kind this source implements, if any.
    fn implemented_kind(&self) -> Option<ServiceInfo>;

    /// Reads a declared member of the implemented kind.
    fn read_member(&self, name: &str) -> Option<MemberValue>;
}

impl<K: MarkerKind> MemberSource for K {
    fn implemented_kind(&self) -> Option<ServiceInfo> {
        Some(ServiceInfo::of::<K>())
    }

    fn read_member(&self, name: &str) -> Option<MemberValue> {
        self.member(name)
    }
}

/// Declares a marker kind. Equality and hashing of markers of the kind are
/// derived from its fields, which become the declared members. Adding
/// `: qualifier` after the name makes the kind a qualifier.
///
/// ```
/// use graph_injector::{marker, Marker, MarkerKind, MemberValue};
///
/// marker! {
///     /// Qualifies the seat a driver sits in.
///     pub struct Drivers: qualifier;
/// }
///
/// marker! {
///     pub struct Priority {
///         pub level: i32,
///     }
/// }
///
/// assert!(Drivers::QUALIFIER);
/// assert!(!Priority::QUALIFIER);
/// assert_eq!(&["level"], Priority::MEMBERS);
///
/// let marker = Marker::new(Priority { level: 3 });
/// assert!(matches!(
///     marker.member("level"),
///     Ok(Some(MemberValue::Int(3)))
/// ));
/// ```
#[macro_export]
macro_rules! marker {
    (@qualifier qualifier) => {
        true
    };
    (@qualifier) => {
        false
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident $(: $flag:ident)?;
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::MarkerKind for $name {
            const QUALIFIER: bool = $crate::marker!(@qualifier $($flag)?);
        }
    };
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident $(: $flag:ident)? {
            $($(#[$field_attr:meta])* $field_vis:vis $field:ident : $ty:ty),*
            $(,)?
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug)]
        $vis struct $name {
            $($(#[$field_attr])* $field_vis $field: $ty),*
        }

        impl $crate::MarkerKind for $name {
            const QUALIFIER: bool = $crate::marker!(@qualifier $($flag)?);
            const MEMBERS: &'static [&'static str] = &[$(stringify!($field)),*];

            fn member(&self, name: &str) -> Option<$crate::MemberValue> {
                $(
                    if name == stringify!($field) {
                        return Some($crate::IntoMemberValue::into_member_value(
                            ::std::clone::Clone::clone(&self.$field),
                        ));
                    }
                )*
                None
            }
        }
    };
}
