use crate::{
    introspect::ancestry, Args, ClassInfo, DynSvc, FieldInfo, InjectError,
    InjectResult, InjectionContext, InjectionPoint, MemberRef, MethodInfo,
    Parameter, RequestInfo, Resolved, ServiceInfo, Svc,
};
use std::any::Any;
use tracing::trace;

/// Builds instances of implementation types: picks a constructor, resolves
/// its parameters through the context, then injects fields and methods
/// across the supertype chain from the root class down to the leaf.
pub struct GraphBuilder<'a> {
    context: &'a InjectionContext,
    request_info: &'a RequestInfo,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder for a request.
    #[must_use]
    pub fn new(
        context: &'a InjectionContext,
        request_info: &'a RequestInfo,
    ) -> Self {
        GraphBuilder {
            context,
            request_info,
        }
    }

    /// Builds an instance of `implementation`, or returns the shared
    /// instance if the type is singleton-scoped and was built before.
    /// Members of a singleton are injected once, when it is created; a
    /// cached singleton is returned as is and not injected again.
    pub fn build(&self, implementation: ServiceInfo) -> InjectResult<DynSvc> {
        let service_path = self.request_info.service_path();
        if service_path.contains(&implementation) {
            let mut cycle = service_path.to_vec();
            cycle.push(implementation);
            return Err(InjectError::CycleDetected {
                service_info: implementation,
                cycle,
            });
        }

        let request_info = self.request_info.with_request(implementation);
        let builder = GraphBuilder::new(self.context, &request_info);
        self.context.cached_or_build(implementation, || {
            builder.construct_and_inject(implementation)
        })
    }

    fn construct_and_inject(
        &self,
        implementation: ServiceInfo,
    ) -> InjectResult<DynSvc> {
        let class = self.context.introspect().class(implementation).ok_or(
            InjectError::MissingClass {
                service_info: implementation,
            },
        )?;

        let mut instance = self.construct(&class)?;
        self.inject_members(class, &mut *instance)?;
        Ok(DynSvc::from(instance))
    }

    fn construct(
        &self,
        class: &ClassInfo,
    ) -> InjectResult<Box<dyn Any + Send + Sync>> {
        let constructor = class.injectable_constructor().ok_or(
            InjectError::NoInjectableConstructor {
                service_info: class.service_info(),
            },
        )?;

        let member = constructor.member_ref();
        self.context
            .introspect()
            .force_accessible(&member, constructor.visibility())?;
        let args = self.resolve_parameters(&member, constructor.parameters())?;

        trace!(%member, "invoking constructor");
        constructor
            .invoke(args)
            .map_err(|source| InjectError::ConstructionFailed {
                member,
                source,
            })
    }

    fn inject_members(
        &self,
        leaf: Svc<ClassInfo>,
        instance: &mut dyn Any,
    ) -> InjectResult<()> {
        let introspect = self.context.introspect();
        let levels = ancestry(introspect, leaf)?;

        // Levels are leaf first, so walking them backwards goes from the root
        // class down to the leaf.
        for depth in (0..levels.len()).rev() {
            let level = &levels[depth];
            let derived = &levels[..depth];

            let fields: Vec<&FieldInfo> = level
                .fields()
                .iter()
                .filter(|field| {
                    field.is_inject() && !field.is_final() && !field.is_static()
                })
                .collect();
            let methods: Vec<&MethodInfo> = level
                .methods()
                .iter()
                .filter(|method| {
                    method.is_inject()
                        && !derived.iter().any(|subtype| {
                            introspect.is_overridden_in(method, level, subtype)
                        })
                })
                .collect();
            if fields.is_empty() && methods.is_empty() {
                continue;
            }

            let target = project(derived, &mut *instance)?;
            for field in fields {
                self.inject_field(field, &mut *target)?;
            }
            for method in methods {
                self.inject_method(method, &mut *target)?;
            }
        }

        Ok(())
    }

    fn inject_field(
        &self,
        field: &FieldInfo,
        target: &mut dyn Any,
    ) -> InjectResult<()> {
        let member = field.member_ref();
        self.context
            .introspect()
            .force_accessible(&member, field.visibility())?;
        let value = self.resolve(&member, &InjectionPoint::of_field(field))?;

        trace!(%member, "injecting field");
        field.set(target, value).map_err(|error| {
            InjectError::ConstructionFailed {
                member,
                source: Box::new(error),
            }
        })
    }

    fn inject_method(
        &self,
        method: &MethodInfo,
        target: &mut dyn Any,
    ) -> InjectResult<()> {
        let member = method.member_ref();
        self.context
            .introspect()
            .force_accessible(&member, method.visibility())?;
        let args = self.resolve_parameters(&member, method.parameters())?;

        trace!(%member, "injecting method");
        method
            .invoke(target, args)
            .map_err(|source| InjectError::ConstructionFailed {
                member,
                source,
            })
    }

    fn resolve_parameters(
        &self,
        member: &MemberRef,
        parameters: &[Parameter],
    ) -> InjectResult<Args> {
        parameters
            .iter()
            .map(|parameter| {
                let point = InjectionPoint::of_parameter(parameter);
                let value = self.resolve(member, &point)?;
                Ok((point.token().clone(), value))
            })
            .collect::<InjectResult<Vec<_>>>()
            .map(Args::new)
    }

    fn resolve(
        &self,
        member: &MemberRef,
        point: &InjectionPoint,
    ) -> InjectResult<Resolved> {
        self.context.resolve(point, self.request_info).map_err(|source| {
            InjectError::DependencyFailed {
                member: member.clone(),
                source: Box::new(source),
            }
        })
    }
}

/// Projects a leaf instance onto the class that `derived` leads up to.
/// `derived` lists the classes below the target, leaf first.
fn project<'i>(
    derived: &[Svc<ClassInfo>],
    instance: &'i mut dyn Any,
) -> InjectResult<&'i mut dyn Any> {
    let mut current = instance;
    for class in derived {
        let supertype = class.supertype().ok_or_else(|| {
            InjectError::InternalError(format!(
                "{} has no supertype to project onto",
                class.service_info()
            ))
        })?;
        let upcast = supertype.upcast().ok_or(InjectError::MissingUpcast {
            service_info: class.service_info(),
            supertype: supertype.service_info(),
        })?;
        current = upcast.apply(current).ok_or_else(|| {
            InjectError::InternalError(format!(
                "the upcast of {} rejected its instance",
                class.service_info()
            ))
        })?;
    }

    Ok(current)
}
