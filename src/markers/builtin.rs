crate::marker! {
    /// Qualifies an injection point by name.
    pub struct Named: qualifier {
        /// The name.
        pub value: String,
    }
}

impl Named {
    /// Creates a name qualifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Named {
            value: value.into(),
        }
    }
}

crate::marker! {
    /// Marks a constructor, field or method for injection.
    pub struct Inject;
}
