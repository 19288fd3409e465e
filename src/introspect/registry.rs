use crate::{
    ClassInfo, Inject, InjectError, InjectResult, Introspect, KindInfo,
    MarkerKind, MemberRef, Named, ServiceInfo, Svc, Visibility,
};
use std::collections::HashMap;
use tracing::trace;

/// Class metadata registered by hand. The built-in marker kinds [`Named`]
/// and [`Inject`] are always registered.
#[derive(Debug)]
pub struct ClassRegistry {
    classes: HashMap<ServiceInfo, Svc<ClassInfo>>,
    kinds: HashMap<ServiceInfo, KindInfo>,
    allow_private_access: bool,
}

impl ClassRegistry {
    /// Creates a registry that allows access to non-public members.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = ClassRegistry {
            classes: HashMap::new(),
            kinds: HashMap::new(),
            allow_private_access: true,
        };
        registry.register_kind::<Named>();
        registry.register_kind::<Inject>();
        registry
    }

    /// Registers the metadata of a class, replacing any previous metadata
    /// for the same class.
    pub fn register(&mut self, class: ClassInfo) {
        self.classes.insert(class.service_info(), Svc::new(class));
    }

    /// Registers a marker kind.
    pub fn register_kind<K: MarkerKind>(&mut self) {
        let kind = KindInfo::of::<K>();
        self.kinds.insert(kind.service_info(), kind);
    }

    /// Sets whether non-public members may be made accessible.
    pub fn set_allow_private_access(&mut self, allow: bool) {
        self.allow_private_access = allow;
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        ClassRegistry::new()
    }
}

impl Introspect for ClassRegistry {
    fn class(&self, service_info: ServiceInfo) -> Option<Svc<ClassInfo>> {
        self.classes.get(&service_info).cloned()
    }

    fn marker_kind(&self, kind: ServiceInfo) -> Option<KindInfo> {
        self.kinds.get(&kind).copied()
    }

    fn force_accessible(
        &self,
        member: &MemberRef,
        visibility: Visibility,
    ) -> InjectResult<()> {
        if visibility == Visibility::Public || self.allow_private_access {
            trace!(%member, ?visibility, "member made accessible");
            Ok(())
        } else {
            Err(InjectError::AccessDenied {
                member: member.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scope, Visibility};

    struct Engine;

    #[test]
    fn builtin_kinds_are_registered() {
        let classes = ClassRegistry::new();
        assert_eq!(
            Some(KindInfo::of::<Named>()),
            classes.marker_kind(ServiceInfo::of::<Named>())
        );
        assert!(classes.marker_kind(ServiceInfo::of::<Engine>()).is_none());
    }

    #[test]
    fn scope_is_read_from_metadata() {
        let mut classes = ClassRegistry::new();
        classes.register(ClassInfo::builder::<Engine>().singleton().build());
        assert!(classes.is_singleton(ServiceInfo::of::<Engine>()));
        assert!(!classes.is_singleton(ServiceInfo::of::<u8>()));
        assert_eq!(
            Scope::Singleton,
            classes.class(ServiceInfo::of::<Engine>()).unwrap().scope()
        );
    }

    #[test]
    fn private_access_can_be_denied() {
        let mut classes = ClassRegistry::new();
        let member = MemberRef::constructor(ServiceInfo::of::<Engine>());
        assert!(classes
            .force_accessible(&member, Visibility::Private)
            .is_ok());

        classes.set_allow_private_access(false);
        assert!(classes.force_accessible(&member, Visibility::Public).is_ok());
        assert!(matches!(
            classes.force_accessible(&member, Visibility::Protected),
            Err(InjectError::AccessDenied { .. })
        ));
    }
}
