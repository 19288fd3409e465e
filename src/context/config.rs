/// What happens when a binding is declared for an injection point that
/// already has one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum DuplicateBindings {
    /// The declaration fails with [`InjectError::DuplicateBinding`].
    ///
    /// [`InjectError::DuplicateBinding`]: crate::InjectError::DuplicateBinding
    #[default]
    Reject,
    /// The new binding replaces the old one.
    Overwrite,
}

/// Configuration for an injection context.
#[derive(Clone, Debug, Default)]
pub struct InjectorConfig {
    /// How duplicate binding declarations are handled.
    pub duplicate_bindings: DuplicateBindings,
}
