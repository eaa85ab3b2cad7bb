//! In-process dependency resolution.
//!
//! Registrations describe how to produce instances of a type; the
//! [`ComponentContext`] walks them on demand, recursively satisfying the
//! dependencies a factory asks for, while the [`LifetimeScope`] paired with
//! each registration decides whether to reuse a previous instance. Circular
//! dependency chains are detected during resolution and rejected, and
//! concurrent first use of a singleton constructs exactly once.
//!
//! ```
//! use std::sync::Arc;
//! use graft_di::{ComponentContext, RegistrationBuilder, RegistrationContext};
//!
//! struct Database { url: String }
//! struct UserService { db: Arc<Database> }
//!
//! let context = ComponentContext::new();
//! context.add_registration(RegistrationContext::singleton(
//!     RegistrationBuilder::<Database>::describe()
//!         .construct_with(|_, _| Ok(Database { url: "postgres://localhost".into() }))
//!         .build(),
//! ));
//! context.add_registration(RegistrationContext::transient(
//!     RegistrationBuilder::<UserService>::describe()
//!         .construct_with(|_, context| {
//!             let db = context.resolve::<Database>()?.ok_or("database is not registered")?;
//!             Ok(UserService { db })
//!         })
//!         .build(),
//! ));
//!
//! let service = context.resolve::<UserService>().unwrap().unwrap();
//! assert_eq!(service.db.url, "postgres://localhost");
//! ```
//!
//! Types implementing [`AutoConstruct`] do not need to be registered up
//! front: [`ComponentContext::resolve_auto`] synthesizes and inserts their
//! registration on first use.

pub mod activation;
pub mod auto;
pub mod context;
pub mod errors;
pub mod lifetime;
pub mod registration;
pub mod registry;
pub mod types;

pub use activation::{ActivationStack, ResolutionContext};
pub use auto::{AutoConstruct, ConstructorDescriptor};
pub use context::ComponentContext;
pub use errors::ResolveError;
pub use lifetime::{LifetimeScope, ProvidedInstanceScope, SingletonScope, TransientScope};
pub use registration::{
    ComponentFactory, DependencyBinding, DependencyFactory, Registration, RegistrationBuilder,
    RegistrationContext,
};
pub use registry::RegistrationScope;
pub use types::{DynError, Injectable, Instance, TypeKey};
