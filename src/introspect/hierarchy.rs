use crate::{
    ClassInfo, InjectResult, Introspect, MethodInfo, ServiceInfo, Svc,
    UsageError, Visibility,
};
use std::collections::HashSet;

/// Walks up the supertype chain of `class` and returns the class whose
/// direct supertype is `base`.
pub fn direct_subclass_of(
    introspect: &dyn Introspect,
    class: ServiceInfo,
    base: ServiceInfo,
) -> Result<Svc<ClassInfo>, UsageError> {
    let mut seen = HashSet::new();
    let mut current = introspect
        .class(class)
        .ok_or(UsageError::UnknownClass { class })?;

    loop {
        if !seen.insert(current.service_info()) {
            return Err(UsageError::CyclicHierarchy { class });
        }

        let supertype = match current.supertype() {
            Some(supertype) => supertype.service_info(),
            None => return Err(UsageError::NotSubclassed { class, base }),
        };
        if supertype == base {
            return Ok(current);
        }

        current = introspect
            .class(supertype)
            .ok_or(UsageError::UnknownClass { class: supertype })?;
    }
}

/// Lists the registered classes from `leaf` up to its root. Walking stops at
/// the first supertype without metadata.
pub(crate) fn ancestry(
    introspect: &dyn Introspect,
    leaf: Svc<ClassInfo>,
) -> InjectResult<Vec<Svc<ClassInfo>>> {
    let class = leaf.service_info();
    let mut seen = HashSet::from([class]);
    let mut levels = vec![leaf];

    while let Some(supertype) =
        levels.last().and_then(|level| level.supertype())
    {
        let supertype = match introspect.class(supertype.service_info()) {
            Some(supertype) => supertype,
            None => break,
        };
        if !seen.insert(supertype.service_info()) {
            return Err(UsageError::CyclicHierarchy { class }.into());
        }
        levels.push(supertype);
    }

    Ok(levels)
}

/// Whether `method`, declared by `declaring`, is overridden in `subtype`.
/// Final and private methods are never overridden, and neither are
/// package-private methods seen from another package. Any other method is
/// overridden by a declaration with the same name and parameter types.
#[must_use]
pub fn is_overridden_in(
    method: &MethodInfo,
    declaring: &ClassInfo,
    subtype: &ClassInfo,
) -> bool {
    match method.visibility() {
        _ if method.is_final() => false,
        Visibility::Private => false,
        Visibility::Package if declaring.package() != subtype.package() => {
            false
        }
        _ => subtype
            .methods()
            .iter()
            .any(|candidate| candidate.has_signature_of(method)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassRegistry, Method};

    struct Root;
    struct Middle;
    struct Leaf;
    struct Loop;

    fn chain() -> ClassRegistry {
        let mut classes = ClassRegistry::new();
        classes.register(ClassInfo::builder::<Root>().build());
        classes.register(
            ClassInfo::builder::<Middle>()
                .supertype(ServiceInfo::of::<Root>(), [])
                .build(),
        );
        classes.register(
            ClassInfo::builder::<Leaf>()
                .supertype(ServiceInfo::of::<Middle>(), [])
                .build(),
        );
        classes.register(
            ClassInfo::builder::<Loop>()
                .supertype(ServiceInfo::of::<Loop>(), [])
                .build(),
        );
        classes
    }

    fn declaring(method: Method, package: &'static str) -> ClassInfo {
        ClassInfo::builder::<Root>()
            .package(package)
            .method(method, |_, _| Ok(()))
            .build()
    }

    #[test]
    fn finds_direct_subclass_through_chain() {
        let classes = chain();
        let found = direct_subclass_of(
            &classes,
            ServiceInfo::of::<Leaf>(),
            ServiceInfo::of::<Root>(),
        )
        .unwrap();
        assert_eq!(ServiceInfo::of::<Middle>(), found.service_info());
    }

    #[test]
    fn cyclic_chain_is_rejected() {
        let classes = chain();
        assert_eq!(
            Err(UsageError::CyclicHierarchy {
                class: ServiceInfo::of::<Loop>()
            }),
            direct_subclass_of(
                &classes,
                ServiceInfo::of::<Loop>(),
                ServiceInfo::of::<Root>(),
            )
            .map(|class| class.service_info())
        );
    }

    #[test]
    fn ancestry_is_leaf_first() {
        let classes = chain();
        let leaf = classes.class(ServiceInfo::of::<Leaf>()).unwrap();
        let levels: Vec<_> = ancestry(&classes, leaf)
            .unwrap()
            .iter()
            .map(|level| level.service_info())
            .collect();
        assert_eq!(
            vec![
                ServiceInfo::of::<Leaf>(),
                ServiceInfo::of::<Middle>(),
                ServiceInfo::of::<Root>(),
            ],
            levels
        );
    }

    #[test]
    fn same_signature_overrides() {
        let method = Method::new("start").param::<u8>();
        let base = declaring(method.clone(), "cars");
        let derived = declaring(method, "cars");
        assert!(is_overridden_in(&base.methods()[0], &base, &derived));

        let other = declaring(Method::new("start").param::<u16>(), "cars");
        assert!(!is_overridden_in(&base.methods()[0], &base, &other));
    }

    #[test]
    fn restricted_methods_are_never_overridden() {
        for (method, subtype_package) in [
            (Method::new("start").mark_final(), "cars"),
            (Method::new("start").visibility(Visibility::Private), "cars"),
            (Method::new("start").visibility(Visibility::Package), "trucks"),
        ] {
            let base = declaring(method.clone(), "cars");
            let derived = declaring(method, subtype_package);
            assert!(!is_overridden_in(&base.methods()[0], &base, &derived));
        }

        let method = Method::new("start").visibility(Visibility::Package);
        let base = declaring(method.clone(), "cars");
        let derived = declaring(method, "cars");
        assert!(is_overridden_in(&base.methods()[0], &base, &derived));
    }
}
