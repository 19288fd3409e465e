use crate::{
    ClassInfo, ClassRegistry, InjectionContext, Injector, InjectorConfig,
    MarkerKind, Svc,
};

/// A builder for an [`Injector`]. Class metadata and marker kinds are
/// registered here; bindings are declared on the built injector.
#[derive(Default)]
pub struct InjectorBuilder {
    classes: ClassRegistry,
    config: InjectorConfig,
}

impl InjectorBuilder {
    /// Registers the metadata of a class the injector may build.
    pub fn register(&mut self, class: ClassInfo) {
        self.classes.register(class);
    }

    /// Registers a marker kind, so that marker literals can be captured for
    /// it.
    pub fn register_kind<K: MarkerKind>(&mut self) {
        self.classes.register_kind::<K>();
    }

    /// Sets whether non-public constructors, fields and methods may be used.
    /// Allowed by default.
    pub fn allow_private_access(&mut self, allow: bool) {
        self.classes.set_allow_private_access(allow);
    }

    /// Gets a mutable reference to the configuration of the injector.
    pub fn config_mut(&mut self) -> &mut InjectorConfig {
        &mut self.config
    }

    /// Builds the injector.
    #[must_use]
    pub fn build(self) -> Injector {
        Injector::new(InjectionContext::with_config(
            Svc::new(self.classes),
            self.config,
        ))
    }
}
