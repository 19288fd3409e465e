//! Object graph dependency injection.
//!
//! An [`Injector`] builds instances of implementation types from class
//! metadata registered up front. For each type, the metadata names a
//! constructor, the fields to assign and the methods to call once the
//! instance exists. Each of those dependencies is an [`InjectionPoint`]: a
//! type plus the qualifier markers attached to it. Bindings map points to
//! implementations.
//!
//! # Bindings
//!
//! A binding is declared for a point, and maps it to the implementation that
//! is built when the point is requested. Points are matched exactly: a point
//! qualified with `@Named("big")` is never satisfied by the unqualified
//! binding for the same type, and the other way around. Duplicate bindings
//! are rejected unless [`DuplicateBindings::Overwrite`] is configured.
//!
//! # Scopes
//!
//! Prototype-scoped types are built for every request. Singleton-scoped
//! types are built at most once per injector, even when requested from
//! several threads at the same time.
//!
//! # Member injection
//!
//! Once an instance is constructed, its fields and methods marked with
//! [`Inject`] are injected, starting at the root of its supertype chain and
//! ending at the class itself. A method overridden further down the chain is
//! skipped at the level that declared it.
//!
//! # Example
//!
//! ```
//! use graph_injector::{
//!     interface, ClassInfo, Constructor, Field, Injector, Marker, Named,
//!     Service, Svc,
//! };
//!
//! trait Engine: Service {
//!     fn start(&self) -> &'static str;
//! }
//!
//! struct V8Engine;
//!
//! impl Engine for V8Engine {
//!     fn start(&self) -> &'static str {
//!         "vroom"
//!     }
//! }
//!
//! interface!(Engine = [V8Engine]);
//!
//! struct Car {
//!     engine: Svc<dyn Engine>,
//!     spare: Option<Svc<dyn Engine>>,
//! }
//!
//! let spare = Marker::new(Named::new("spare"));
//!
//! let mut builder = Injector::builder();
//! builder.register(
//!     ClassInfo::builder::<V8Engine>()
//!         .constructor(Constructor::new(), |_| Ok(V8Engine))
//!         .build(),
//! );
//! builder.register(
//!     ClassInfo::builder::<Car>()
//!         .constructor(
//!             Constructor::new().inject().param::<dyn Engine>(),
//!             |mut args| {
//!                 Ok(Car {
//!                     engine: args.take()?,
//!                     spare: None,
//!                 })
//!             },
//!         )
//!         .field(
//!             Field::<dyn Engine>::new("spare")
//!                 .inject()
//!                 .annotate(spare.clone()),
//!             |car, engine| car.spare = Some(engine),
//!         )
//!         .build(),
//! );
//!
//! let injector = builder.build();
//! injector.binding_for::<dyn Engine>([]).map::<V8Engine>()?;
//! injector.binding_for::<dyn Engine>([spare]).map::<V8Engine>()?;
//! injector.binding_for::<Car>([]).map::<Car>()?;
//!
//! let car: Svc<Car> = injector.get_instance()?;
//! assert_eq!("vroom", car.engine.start());
//! assert!(car.spare.is_some());
//! # Ok::<(), graph_injector::InjectError>(())
//! ```

#![forbid(unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value
)]

mod builder;
mod context;
mod graph;
mod injector;
mod introspect;
mod markers;
mod point;
mod requests;
mod services;
mod types;

pub use builder::*;
pub use context::*;
pub use graph::*;
pub use injector::*;
pub use introspect::*;
pub use markers::*;
pub use point::*;
pub use requests::*;
pub use services::*;
pub use types::*;
