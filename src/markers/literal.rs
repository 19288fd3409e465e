use crate::MarkerKind;
use std::fmt::Debug;

/// A marker literal: a value that declares which marker kind it stands for.
///
/// A literal that carries no value of its kind can still be used as a marker
/// of a kind without members. Reading the members of a kind that declares
/// some fails, and [`Marker::use_strict`] rejects such literals up front.
///
/// ```
/// use graph_injector::{marker, Marker, MarkerLiteral};
///
/// marker! {
///     pub struct Drivers: qualifier;
/// }
///
/// #[derive(Debug)]
/// struct DriversLiteral;
///
/// impl MarkerLiteral for DriversLiteral {
///     type Kind = Drivers;
///
///     fn as_kind(&self) -> Option<&Drivers> {
///         Some(&Drivers)
///     }
/// }
///
/// let marker = Marker::from_literal(DriversLiteral).use_strict().unwrap();
/// assert_eq!(Marker::new(Drivers), marker);
/// ```
///
/// [`Marker::use_strict`]: crate::Marker::use_strict
pub trait MarkerLiteral: Send + Sync + Debug + 'static {
    /// The declared kind of this literal.
    type Kind: MarkerKind;

    /// Views this literal as a value of its declared kind, if it is one.
    fn as_kind(&self) -> Option<&Self::Kind> {
        None
    }
}
