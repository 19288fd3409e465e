use crate::{
    introspect::direct_subclass_of, markers::hash::string_hash, Introspect,
    KindInfo, MarkerKind, MarkerLiteral, MemberSource, MemberValue,
    ServiceInfo, Svc, UsageError,
};
use derive_more::{Display, Error};
use once_cell::sync::OnceCell;
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};

type Members = Vec<(&'static str, MemberValue)>;

/// An error reading the members of a marker.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
pub enum MarkerError {
    /// The marker has a kind with members, but carries no value of that kind
    /// to read them from.
    #[display(
        fmt = "{} does not implement the marker kind {} with members",
        literal,
        kind
    )]
    NotImplemented {
        /// The type name of the literal.
        literal: &'static str,
        /// The declared kind.
        kind: ServiceInfo,
    },

    /// A declared member could not be read.
    #[display(fmt = "member {} of {} could not be read", member, kind)]
    UnreadableMember {
        /// The declared kind.
        kind: ServiceInfo,
        /// The name of the member.
        member: &'static str,
    },
}

/// A marker value attached to a constructor, field, method or parameter.
/// Markers of qualifier kinds narrow which binding satisfies an injection
/// point.
///
/// Two markers are equal iff they have the same kind and all declared
/// members are equal. Members are read once, the first time they are
/// needed, and cached for the lifetime of the marker.
///
/// ```
/// use graph_injector::{Marker, Named};
///
/// let a = Marker::new(Named::new("front"));
/// let b = Marker::new(Named::new("front"));
/// let c = Marker::new(Named::new("back"));
///
/// assert_eq!(a, b);
/// assert_eq!(a.hash_code(), b.hash_code());
/// assert_ne!(a, c);
/// ```
#[derive(Clone)]
pub struct Marker {
    inner: Svc<MarkerInner>,
}

struct MarkerInner {
    kind: KindInfo,
    literal: &'static str,
    source: Option<Box<dyn MemberSource>>,
    members: OnceCell<Result<Members, MarkerError>>,
}

impl Marker {
    fn from_parts(
        kind: KindInfo,
        literal: &'static str,
        source: Option<Box<dyn MemberSource>>,
    ) -> Self {
        Marker {
            inner: Svc::new(MarkerInner {
                kind,
                literal,
                source,
                members: OnceCell::new(),
            }),
        }
    }

    /// Creates a marker from a value of its kind.
    #[must_use]
    pub fn new<K: MarkerKind>(value: K) -> Self {
        Marker::from_parts(
            KindInfo::of::<K>(),
            std::any::type_name::<K>(),
            Some(Box::new(value)),
        )
    }

    /// Creates a marker that carries only its kind. Reading the members of
    /// such a marker fails if the kind declares any.
    #[must_use]
    pub fn literal<K: MarkerKind>() -> Self {
        Marker::from_parts(KindInfo::of::<K>(), "Marker::literal", None)
    }

    /// Creates a marker from a literal.
    #[must_use]
    pub fn from_literal<L: MarkerLiteral>(literal: L) -> Self {
        let source = literal.as_kind().map(|value| {
            Box::new(value.clone()) as Box<dyn MemberSource>
        });
        Marker::from_parts(
            KindInfo::of::<L::Kind>(),
            std::any::type_name::<L>(),
            source,
        )
    }

    /// Creates a marker for a registered literal class. The class must
    /// subclass [`Marker`], possibly through intermediate classes, and pass
    /// the kind as the type argument. Members are read from `source`.
    pub fn capture(
        introspect: &dyn Introspect,
        class: ServiceInfo,
        source: Option<Box<dyn MemberSource>>,
    ) -> Result<Self, UsageError> {
        let subclass =
            direct_subclass_of(introspect, class, ServiceInfo::of::<Marker>())?;
        let missing = UsageError::MissingTypeParameter {
            class: subclass.service_info(),
        };
        let kind = subclass
            .supertype()
            .and_then(|supertype| supertype.arguments().first())
            .ok_or_else(|| missing.clone())?
            .raw_type()
            .ok_or(missing)?;
        let kind = introspect
            .marker_kind(kind)
            .ok_or(UsageError::UnknownMarkerKind { kind })?;

        Ok(Marker::from_parts(kind, class.name(), source))
    }

    /// Rejects this marker unless it carries a value of its own declared
    /// kind.
    pub fn use_strict(self) -> Result<Self, UsageError> {
        let kind = self.inner.kind.service_info();
        let implemented = self
            .inner
            .source
            .as_ref()
            .and_then(|source| source.implemented_kind());

        if implemented == Some(kind) {
            Ok(self)
        } else {
            Err(UsageError::StrictKindMismatch {
                literal: self.inner.literal,
                kind,
            })
        }
    }

    /// The kind of this marker.
    #[must_use]
    pub fn kind(&self) -> KindInfo {
        self.inner.kind
    }

    /// Whether this marker takes part in binding lookup.
    #[must_use]
    pub fn is_qualifier(&self) -> bool {
        self.inner.kind.is_qualifier()
    }

    /// Checks whether this marker has the given kind.
    #[must_use]
    pub fn is<K: MarkerKind>(&self) -> bool {
        self.inner.kind.service_info() == ServiceInfo::of::<K>()
    }

    /// Reads all declared members, in declaration order.
    pub fn members(
        &self,
    ) -> Result<&[(&'static str, MemberValue)], MarkerError> {
        self.inner
            .members
            .get_or_init(|| self.read_members())
            .as_ref()
            .map(Vec::as_slice)
            .map_err(Clone::clone)
    }

    /// Reads a single declared member.
    pub fn member(
        &self,
        name: &str,
    ) -> Result<Option<&MemberValue>, MarkerError> {
        Ok(self
            .members()?
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, value)| value))
    }

    fn read_members(&self) -> Result<Members, MarkerError> {
        let kind = self.inner.kind;
        if kind.members().is_empty() {
            return Ok(Vec::new());
        }

        let source = self
            .inner
            .source
            .as_ref()
            .filter(|source| {
                source.implemented_kind() == Some(kind.service_info())
            })
            .ok_or(MarkerError::NotImplemented {
                literal: self.inner.literal,
                kind: kind.service_info(),
            })?;

        kind.members()
            .iter()
            .map(|&name| {
                source.read_member(name).map(|value| (name, value)).ok_or(
                    MarkerError::UnreadableMember {
                        kind: kind.service_info(),
                        member: name,
                    },
                )
            })
            .collect()
    }

    /// Compares two markers member by member.
    pub fn try_eq(&self, other: &Marker) -> Result<bool, MarkerError> {
        if Svc::ptr_eq(&self.inner, &other.inner) {
            return Ok(true);
        }
        if self.inner.kind != other.inner.kind {
            return Ok(false);
        }

        for ((_, a), (_, b)) in self.members()?.iter().zip(other.members()?) {
            if !a.try_eq(b)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Computes the hash code of this marker: the hash of its kind plus, for
    /// each member, `(127 * hash(name)) ^ hash(value)`.
    pub fn hash_code(&self) -> Result<i32, MarkerError> {
        let mut hash = self.inner.kind.hash_code();
        for (name, value) in self.members()? {
            let member =
                string_hash(name).wrapping_mul(127) ^ value.hash_code()?;
            hash = hash.wrapping_add(member);
        }

        Ok(hash)
    }
}

/// # Panics
///
/// Panics if the members of either marker cannot be read.
impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other)
            .unwrap_or_else(|error| panic!("malformed marker: {}", error))
    }
}

impl Eq for Marker {}

/// # Panics
///
/// Panics if the members of the marker cannot be read.
impl Hash for Marker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let hash = self
            .hash_code()
            .unwrap_or_else(|error| panic!("malformed marker: {}", error));
        state.write_i32(hash);
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.inner.kind.service_info())?;
        match self.members() {
            Ok([]) => Ok(()),
            Ok(members) => {
                write!(f, "(")?;
                for (index, (name, value)) in members.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, value)?;
                }
                write!(f, ")")
            }
            Err(_) => write!(f, "(?)"),
        }
    }
}

impl Debug for Marker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marker")
            .field("kind", &self.inner.kind.service_info())
            .field("literal", &self.inner.literal)
            .field("members", &self.inner.members.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{marker, ClassInfo, ClassRegistry, Inject, Named};
    use std::collections::HashSet;

    marker! {
        struct Drivers: qualifier;
    }

    marker! {
        struct Tagged: qualifier {
            tags: Vec<String>,
            weight: f64,
        }
    }

    #[derive(Debug)]
    struct EmptyLiteral;

    impl MarkerLiteral for EmptyLiteral {
        type Kind = Named;
    }

    struct DriversClass;
    struct NamedClass;

    fn tagged(tags: &[&str], weight: f64) -> Marker {
        Marker::new(Tagged {
            tags: tags.iter().map(|&tag| tag.to_owned()).collect(),
            weight,
        })
    }

    #[test]
    fn equal_members_give_equal_markers() {
        let a = tagged(&["x", "y"], 1.5);
        let b = tagged(&["x", "y"], 1.5);
        let c = tagged(&["x"], 1.5);

        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(2, set.len());
    }

    #[test]
    fn nan_members_are_equal() {
        assert_eq!(tagged(&[], f64::NAN), tagged(&[], f64::NAN));
    }

    #[test]
    fn memberless_markers_compare_by_kind() {
        assert_eq!(Marker::new(Drivers), Marker::literal::<Drivers>());
        assert_ne!(Marker::new(Drivers), Marker::new(Inject));
        assert_eq!(
            Marker::literal::<Drivers>().hash_code(),
            Ok(string_hash(ServiceInfo::of::<Drivers>().name()))
        );
    }

    #[test]
    fn hash_code_combines_kind_and_members() {
        let marker = Marker::new(Named::new("hello"));
        let expected = string_hash(ServiceInfo::of::<Named>().name())
            .wrapping_add(
                string_hash("value").wrapping_mul(127) ^ string_hash("hello"),
            );
        assert_eq!(Ok(expected), marker.hash_code());
    }

    #[test]
    fn literal_without_members_fails_lazily() {
        let marker = Marker::from_literal(EmptyLiteral);
        assert_eq!(
            Err(MarkerError::NotImplemented {
                literal: std::any::type_name::<EmptyLiteral>(),
                kind: ServiceInfo::of::<Named>(),
            }),
            marker.members().map(<[_]>::len)
        );
        assert!(marker.try_eq(&Marker::new(Named::new("a"))).is_err());
    }

    #[test]
    #[should_panic(expected = "malformed marker")]
    fn malformed_marker_panics_on_comparison() {
        let _ = Marker::literal::<Named>() == Marker::new(Named::new("a"));
    }

    #[test]
    fn strict_literal_must_implement_kind() {
        match Marker::from_literal(EmptyLiteral).use_strict() {
            Err(UsageError::StrictKindMismatch { kind, .. })
                if kind == ServiceInfo::of::<Named>() => {}
            result => panic!("unexpected result: {:?}", result),
        }
        assert!(Marker::new(Named::new("a")).use_strict().is_ok());
    }

    #[test]
    fn capture_reads_kind_from_class_chain() {
        let mut classes = ClassRegistry::new();
        classes.register_kind::<Drivers>();
        classes.register(
            ClassInfo::builder::<DriversClass>()
                .supertype(
                    ServiceInfo::of::<Marker>(),
                    [crate::TypeDescriptor::of::<Drivers>()],
                )
                .build(),
        );
        classes.register(
            ClassInfo::builder::<NamedClass>()
                .supertype(ServiceInfo::of::<DriversClass>(), [])
                .build(),
        );

        let marker =
            Marker::capture(&classes, ServiceInfo::of::<NamedClass>(), None)
                .unwrap();
        assert!(marker.is::<Drivers>());
        assert_eq!(Marker::new(Drivers), marker);
        assert!(marker.use_strict().is_err());
    }

    #[test]
    fn capture_rejects_unregistered_kind() {
        let mut classes = ClassRegistry::new();
        classes.register(
            ClassInfo::builder::<DriversClass>()
                .supertype(
                    ServiceInfo::of::<Marker>(),
                    [crate::TypeDescriptor::of::<Drivers>()],
                )
                .build(),
        );

        assert_eq!(
            Err(UsageError::UnknownMarkerKind {
                kind: ServiceInfo::of::<Drivers>()
            }),
            Marker::capture(&classes, ServiceInfo::of::<DriversClass>(), None)
                .map(|marker| marker.kind())
        );
    }
}
