use crate::{
    introspect::hierarchy, ClassInfo, InjectResult, KindInfo, MemberRef,
    MethodInfo, Scope, ServiceInfo, Svc, Visibility,
};

/// Describes the classes the injector can build. The graph builder reads
/// declared constructors, fields and methods through this trait, and asks it
/// for access before touching a member.
///
/// [`ClassRegistry`] is the implementation used by
/// [`InjectorBuilder`](crate::InjectorBuilder).
///
/// [`ClassRegistry`]: crate::ClassRegistry
pub trait Introspect: Send + Sync {
    /// Gets the metadata of a class.
    fn class(&self, service_info: ServiceInfo) -> Option<Svc<ClassInfo>>;

    /// Gets a registered marker kind.
    fn marker_kind(&self, kind: ServiceInfo) -> Option<KindInfo> {
        let _ = kind;
        None
    }

    /// Whether a class is singleton-scoped.
    fn is_singleton(&self, service_info: ServiceInfo) -> bool {
        self.class(service_info)
            .map_or(false, |class| class.scope() == Scope::Singleton)
    }

    /// Makes a member accessible, failing if access is not allowed.
    fn force_accessible(
        &self,
        member: &MemberRef,
        visibility: Visibility,
    ) -> InjectResult<()> {
        let _ = (member, visibility);
        Ok(())
    }

    /// Whether `method`, declared by `declaring`, is overridden by a
    /// declaration in `subtype`.
    fn is_overridden_in(
        &self,
        method: &MethodInfo,
        declaring: &ClassInfo,
        subtype: &ClassInfo,
    ) -> bool {
        hierarchy::is_overridden_in(method, declaring, subtype)
    }
}
