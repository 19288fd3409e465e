use crate::{
    BoxError, Inject, InjectError, InjectResult, Interface, Marker, Resolved,
    ServiceInfo, Svc, TypeToken,
};
use derive_more::Display;
use std::{any::Any, marker::PhantomData};

/// How visible a member is outside of its declaring type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Visibility {
    /// Visible everywhere.
    #[default]
    Public,
    /// Visible to subtypes.
    Protected,
    /// Visible within the declaring package only.
    Package,
    /// Visible within the declaring type only.
    Private,
}

/// The kind of a declared member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum MemberKind {
    #[display(fmt = "constructor")]
    Constructor,
    #[display(fmt = "field")]
    Field,
    #[display(fmt = "method")]
    Method,
}

/// Identifies a declared member in errors and logs.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[display(fmt = "{} {}::{}", kind, declaring, name)]
pub struct MemberRef {
    declaring: ServiceInfo,
    kind: MemberKind,
    name: &'static str,
}

impl MemberRef {
    /// Refers to a member of a type.
    #[must_use]
    pub fn new(
        declaring: ServiceInfo,
        kind: MemberKind,
        name: &'static str,
    ) -> Self {
        MemberRef {
            declaring,
            kind,
            name,
        }
    }

    /// Refers to the constructor of a type.
    #[must_use]
    pub fn constructor(declaring: ServiceInfo) -> Self {
        MemberRef::new(declaring, MemberKind::Constructor, "new")
    }

    /// The type declaring the member.
    #[must_use]
    pub fn declaring(&self) -> ServiceInfo {
        self.declaring
    }

    /// The kind of the member.
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// The name of the member.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A declared parameter of a constructor or method.
#[derive(Clone, Debug)]
pub struct Parameter {
    token: TypeToken,
    markers: Vec<Marker>,
}

impl Parameter {
    /// Declares a parameter.
    #[must_use]
    pub fn new(
        token: TypeToken,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        Parameter {
            token,
            markers: markers.into_iter().collect(),
        }
    }

    /// The declared type of the parameter.
    #[must_use]
    pub fn token(&self) -> &TypeToken {
        &self.token
    }

    /// The markers attached to the parameter.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// The resolved arguments of a constructor or method, in declaration order.
pub struct Args {
    values: std::vec::IntoIter<(TypeToken, Resolved)>,
}

impl Args {
    pub(crate) fn new(values: Vec<(TypeToken, Resolved)>) -> Self {
        Args {
            values: values.into_iter(),
        }
    }

    /// Takes the next argument.
    pub fn take<I: ?Sized + Interface>(&mut self) -> InjectResult<Svc<I>> {
        let expected = ServiceInfo::of::<I>();
        let (point, value) = self
            .values
            .next()
            .ok_or(InjectError::MissingArgument { expected })?;

        value
            .downcast::<Svc<I>>()
            .map(|value| *value)
            .map_err(|_| InjectError::ArgumentMismatch { expected, point })
    }

    /// The number of arguments left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether all arguments have been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_inject(markers: &[Marker]) -> bool {
    markers.iter().any(Marker::is::<Inject>)
}

/// Declares a constructor. Passed to [`ClassBuilder::constructor`].
///
/// [`ClassBuilder::constructor`]: crate::ClassBuilder::constructor
#[derive(Clone, Debug, Default)]
pub struct Constructor {
    pub(crate) markers: Vec<Marker>,
    pub(crate) visibility: Visibility,
    pub(crate) parameters: Vec<Parameter>,
}

impl Constructor {
    /// Declares a public constructor without parameters.
    #[must_use]
    pub fn new() -> Self {
        Constructor::default()
    }

    /// Marks the constructor for injection.
    #[must_use]
    pub fn inject(self) -> Self {
        self.annotate(Marker::new(Inject))
    }

    /// Attaches a marker to the constructor.
    #[must_use]
    pub fn annotate(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Sets the visibility of the constructor.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Declares an unqualified parameter.
    #[must_use]
    pub fn param<I: ?Sized + Interface>(self) -> Self {
        self.param_token(TypeToken::of::<I>(), [])
    }

    /// Declares a parameter with markers attached.
    #[must_use]
    pub fn qualified_param<I: ?Sized + Interface>(
        self,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        self.param_token(TypeToken::of::<I>(), markers)
    }

    /// Declares a parameter of an explicit type shape.
    #[must_use]
    pub fn param_token(
        mut self,
        token: TypeToken,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        self.parameters.push(Parameter::new(token, markers));
        self
    }
}

/// Declares a field holding a `Svc<I>`. Passed to [`ClassBuilder::field`].
///
/// [`ClassBuilder::field`]: crate::ClassBuilder::field
#[derive(Debug)]
pub struct Field<I: ?Sized> {
    pub(crate) name: &'static str,
    pub(crate) token: TypeToken,
    pub(crate) markers: Vec<Marker>,
    pub(crate) visibility: Visibility,
    pub(crate) is_final: bool,
    pub(crate) is_static: bool,
    marker: PhantomData<fn() -> Svc<I>>,
}

impl<I: ?Sized + Interface> Field<I> {
    /// Declares a public, mutable instance field.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Field {
            name,
            token: TypeToken::of::<I>(),
            markers: Vec::new(),
            visibility: Visibility::Public,
            is_final: false,
            is_static: false,
            marker: PhantomData,
        }
    }

    /// Declares the field with an explicit type shape.
    #[must_use]
    pub fn with_token(mut self, token: TypeToken) -> Self {
        self.token = token;
        self
    }

    /// Marks the field for injection.
    #[must_use]
    pub fn inject(self) -> Self {
        self.annotate(Marker::new(Inject))
    }

    /// Attaches a marker to the field.
    #[must_use]
    pub fn annotate(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Sets the visibility of the field.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the field as immutable.
    #[must_use]
    pub fn mark_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Marks the field as type-level state.
    #[must_use]
    pub fn mark_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Declares a method. Passed to [`ClassBuilder::method`].
///
/// [`ClassBuilder::method`]: crate::ClassBuilder::method
#[derive(Clone, Debug)]
pub struct Method {
    pub(crate) name: &'static str,
    pub(crate) markers: Vec<Marker>,
    pub(crate) visibility: Visibility,
    pub(crate) is_final: bool,
    pub(crate) parameters: Vec<Parameter>,
}

impl Method {
    /// Declares a public, overridable method without parameters.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Method {
            name,
            markers: Vec::new(),
            visibility: Visibility::Public,
            is_final: false,
            parameters: Vec::new(),
        }
    }

    /// Marks the method for injection.
    #[must_use]
    pub fn inject(self) -> Self {
        self.annotate(Marker::new(Inject))
    }

    /// Attaches a marker to the method.
    #[must_use]
    pub fn annotate(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Sets the visibility of the method.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the method as not overridable.
    #[must_use]
    pub fn mark_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Declares an unqualified parameter.
    #[must_use]
    pub fn param<I: ?Sized + Interface>(self) -> Self {
        self.param_token(TypeToken::of::<I>(), [])
    }

    /// Declares a parameter with markers attached.
    #[must_use]
    pub fn qualified_param<I: ?Sized + Interface>(
        self,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        self.param_token(TypeToken::of::<I>(), markers)
    }

    /// Declares a parameter of an explicit type shape.
    #[must_use]
    pub fn param_token(
        mut self,
        token: TypeToken,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        self.parameters.push(Parameter::new(token, markers));
        self
    }
}

pub(crate) type ConstructFn =
    dyn Fn(Args) -> Result<Box<dyn Any + Send + Sync>, BoxError> + Send + Sync;
pub(crate) type SetFn =
    dyn Fn(&mut dyn Any, Resolved) -> InjectResult<()> + Send + Sync;
pub(crate) type InvokeFn =
    dyn Fn(&mut dyn Any, Args) -> Result<(), BoxError> + Send + Sync;

/// A declared constructor.
#[derive(Clone)]
pub struct ConstructorInfo {
    pub(crate) declaring: ServiceInfo,
    pub(crate) declaration: Constructor,
    pub(crate) invoke: Svc<ConstructFn>,
}

impl ConstructorInfo {
    /// Refers to this constructor.
    #[must_use]
    pub fn member_ref(&self) -> MemberRef {
        MemberRef::constructor(self.declaring)
    }

    /// Whether the constructor is marked for injection.
    #[must_use]
    pub fn is_inject(&self) -> bool {
        is_inject(&self.declaration.markers)
    }

    /// The visibility of the constructor.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.declaration.visibility
    }

    /// The declared parameters, in order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.declaration.parameters
    }

    pub(crate) fn invoke(
        &self,
        args: Args,
    ) -> Result<Box<dyn Any + Send + Sync>, BoxError> {
        (self.invoke)(args)
    }
}

/// A declared field.
#[derive(Clone)]
pub struct FieldInfo {
    pub(crate) declaring: ServiceInfo,
    pub(crate) name: &'static str,
    pub(crate) token: TypeToken,
    pub(crate) markers: Vec<Marker>,
    pub(crate) visibility: Visibility,
    pub(crate) is_final: bool,
    pub(crate) is_static: bool,
    pub(crate) set: Svc<SetFn>,
}

impl FieldInfo {
    /// Refers to this field.
    #[must_use]
    pub fn member_ref(&self) -> MemberRef {
        MemberRef::new(self.declaring, MemberKind::Field, self.name)
    }

    /// The name of the field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared type of the field.
    #[must_use]
    pub fn token(&self) -> &TypeToken {
        &self.token
    }

    /// The markers attached to the field.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Whether the field is marked for injection.
    #[must_use]
    pub fn is_inject(&self) -> bool {
        is_inject(&self.markers)
    }

    /// The visibility of the field.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether the field is immutable.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Whether the field is type-level state.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub(crate) fn set(
        &self,
        instance: &mut dyn Any,
        value: Resolved,
    ) -> InjectResult<()> {
        (self.set)(instance, value)
    }
}

/// A declared method.
#[derive(Clone)]
pub struct MethodInfo {
    pub(crate) declaring: ServiceInfo,
    pub(crate) declaration: Method,
    pub(crate) invoke: Svc<InvokeFn>,
}

impl MethodInfo {
    /// Refers to this method.
    #[must_use]
    pub fn member_ref(&self) -> MemberRef {
        MemberRef::new(
            self.declaring,
            MemberKind::Method,
            self.declaration.name,
        )
    }

    /// The name of the method.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.declaration.name
    }

    /// Whether the method is marked for injection.
    #[must_use]
    pub fn is_inject(&self) -> bool {
        is_inject(&self.declaration.markers)
    }

    /// The visibility of the method.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.declaration.visibility
    }

    /// Whether the method cannot be overridden.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.declaration.is_final
    }

    /// The declared parameters, in order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.declaration.parameters
    }

    /// Whether both methods have the same name and parameter types.
    #[must_use]
    pub fn has_signature_of(&self, other: &MethodInfo) -> bool {
        self.name() == other.name()
            && self.parameters().len() == other.parameters().len()
            && self
                .parameters()
                .iter()
                .zip(other.parameters())
                .all(|(a, b)| a.token() == b.token())
    }

    pub(crate) fn invoke(
        &self,
        instance: &mut dyn Any,
        args: Args,
    ) -> Result<(), BoxError> {
        (self.invoke)(instance, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_are_taken_in_order() {
        let mut args = Args::new(vec![
            (TypeToken::of::<u8>(), Box::new(Svc::new(1u8)) as Resolved),
            (TypeToken::of::<u16>(), Box::new(Svc::new(2u16)) as Resolved),
        ]);

        assert_eq!(2, args.len());
        assert_eq!(1, *args.take::<u8>().unwrap());
        assert_eq!(2, *args.take::<u16>().unwrap());
        assert!(args.is_empty());
        assert!(matches!(
            args.take::<u32>(),
            Err(InjectError::MissingArgument { .. })
        ));
    }

    #[test]
    fn mismatched_arg_is_reported() {
        let mut args = Args::new(vec![(
            TypeToken::of::<u8>(),
            Box::new(Svc::new(1u8)) as Resolved,
        )]);

        match args.take::<String>() {
            Err(InjectError::ArgumentMismatch { expected, point })
                if expected == ServiceInfo::of::<String>()
                    && point == TypeToken::of::<u8>() => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!(),
        }
    }

    #[test]
    fn member_ref_names_declaring_type() {
        let member = MemberRef::new(
            ServiceInfo::of::<u8>(),
            MemberKind::Method,
            "start",
        );
        assert_eq!("method u8::start", member.to_string());
        assert_eq!(
            "constructor u8::new",
            MemberRef::constructor(ServiceInfo::of::<u8>()).to_string()
        );
    }
}
