use crate::{
    FieldInfo, Interface, Marker, MarkerError, Parameter, TypeToken,
};
use std::{
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

/// A place that requires a dependency: a type plus the qualifier markers
/// narrowing which binding satisfies it. Injection points are the keys of
/// the binding registry.
///
/// Markers whose kind is not a qualifier are dropped when the point is
/// created, so they have no effect on lookup. Qualifiers whose members
/// cannot be read are kept as they are; [`InjectionPoint::validate`] reports
/// them.
///
/// ```
/// use graph_injector::{Inject, InjectionPoint, Marker, Named};
///
/// let point = InjectionPoint::of::<String>([
///     Marker::new(Named::new("greeting")),
///     Marker::new(Inject),
/// ]);
/// assert_eq!(1, point.qualifiers().len());
/// ```
#[derive(Clone, Debug)]
pub struct InjectionPoint {
    token: TypeToken,
    qualifiers: Vec<Marker>,
}

impl InjectionPoint {
    /// Creates an injection point for a type token.
    #[must_use]
    pub fn new(
        token: TypeToken,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        let mut qualifiers: Vec<Marker> = Vec::new();
        for marker in markers {
            if marker.is_qualifier()
                && !qualifiers.iter().any(|kept| same_marker(kept, &marker))
            {
                qualifiers.push(marker);
            }
        }

        InjectionPoint { token, qualifiers }
    }

    /// Creates an injection point for an interface type.
    #[must_use]
    pub fn of<I: ?Sized + Interface>(
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        InjectionPoint::new(TypeToken::of::<I>(), markers)
    }

    /// Creates the injection point of a declared parameter.
    #[must_use]
    pub fn of_parameter(parameter: &Parameter) -> Self {
        InjectionPoint::new(
            parameter.token().clone(),
            parameter.markers().iter().cloned(),
        )
    }

    /// Creates the injection point of a declared field.
    #[must_use]
    pub fn of_field(field: &FieldInfo) -> Self {
        InjectionPoint::new(
            field.token().clone(),
            field.markers().iter().cloned(),
        )
    }

    /// The type requested by this point.
    #[must_use]
    pub fn token(&self) -> &TypeToken {
        &self.token
    }

    /// The qualifiers of this point.
    #[must_use]
    pub fn qualifiers(&self) -> &[Marker] {
        &self.qualifiers
    }

    /// Checks that the members of every qualifier can be read.
    pub fn validate(&self) -> Result<(), MarkerError> {
        self.qualifiers
            .iter()
            .try_for_each(|qualifier| qualifier.hash_code().map(drop))
    }
}

// A malformed marker only matches itself.
fn same_marker(a: &Marker, b: &Marker) -> bool {
    a.try_eq(b) == Ok(true)
}

impl PartialEq for InjectionPoint {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
            && self.qualifiers.len() == other.qualifiers.len()
            && self
                .qualifiers
                .iter()
                .all(|qualifier| {
                    other
                        .qualifiers
                        .iter()
                        .any(|candidate| same_marker(qualifier, candidate))
                })
    }
}

impl Eq for InjectionPoint {}

impl Hash for InjectionPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        let qualifiers = self
            .qualifiers
            .iter()
            .fold(0i32, |sum, qualifier| {
                sum.wrapping_add(qualifier.hash_code().unwrap_or(0))
            });
        state.write_i32(qualifiers);
    }
}

impl Display for InjectionPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token)?;
        for qualifier in &self.qualifiers {
            write!(f, " {}", qualifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{marker, Inject, Named};
    use std::collections::HashSet;

    marker! {
        struct Drivers: qualifier;
    }

    marker! {
        struct Documented;
    }

    #[test]
    fn non_qualifiers_are_dropped() {
        let point = InjectionPoint::of::<u8>([
            Marker::new(Inject),
            Marker::new(Documented),
            Marker::new(Drivers),
        ]);
        assert_eq!(&[Marker::new(Drivers)], point.qualifiers());
        assert_eq!(
            InjectionPoint::of::<u8>([Marker::new(Drivers)]),
            point
        );
    }

    #[test]
    fn qualifier_order_does_not_matter() {
        let a = InjectionPoint::of::<u8>([
            Marker::new(Drivers),
            Marker::new(Named::new("a")),
        ]);
        let b = InjectionPoint::of::<u8>([
            Marker::new(Named::new("a")),
            Marker::new(Drivers),
        ]);

        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(1, set.len());
    }

    #[test]
    fn qualified_and_unqualified_points_differ() {
        let plain = InjectionPoint::of::<u8>([]);
        let named = InjectionPoint::of::<u8>([Marker::new(Named::new("a"))]);
        let other = InjectionPoint::of::<u8>([Marker::new(Named::new("b"))]);

        assert_ne!(plain, named);
        assert_ne!(named, other);
        assert_ne!(plain, InjectionPoint::of::<u16>([]));
    }

    #[test]
    fn duplicate_qualifiers_collapse() {
        let point = InjectionPoint::of::<u8>([
            Marker::new(Drivers),
            Marker::literal::<Drivers>(),
        ]);
        assert_eq!(1, point.qualifiers().len());
    }

    #[test]
    fn malformed_qualifiers_are_kept_and_reported() {
        let malformed = Marker::literal::<Named>();
        let point = InjectionPoint::of::<u8>([
            Marker::new(Named::new("a")),
            malformed.clone(),
            malformed,
        ]);

        assert_eq!(2, point.qualifiers().len());
        assert!(point.validate().is_err());
        assert!(InjectionPoint::of::<u8>([Marker::new(Named::new("a"))])
            .validate()
            .is_ok());
    }

    #[test]
    fn malformed_points_compare_without_panicking() {
        let a = InjectionPoint::of::<u8>([Marker::literal::<Named>()]);
        let b = InjectionPoint::of::<u8>([Marker::literal::<Named>()]);

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        let set: HashSet<_> = [a.clone(), a].into_iter().collect();
        assert_eq!(1, set.len());
    }
}
