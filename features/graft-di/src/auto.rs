use crate::{
    context::ComponentContext,
    registration::{DependencyBinding, Registration, RegistrationBuilder},
    types::{DynError, Injectable},
};

/// A type whose constructor is statically known to be satisfiable from other
/// resolvable types
///
/// Implementing this trait is the capability that lets
/// [`ComponentContext::resolve_auto`] synthesize a registration on first use.
/// Plain `resolve` never falls back: for a type without this capability the
/// absence of a registration is simply no instance.
pub trait AutoConstruct: Injectable + Sized {
    fn constructor() -> ConstructorDescriptor<Self>;
}

/// Describes an auto-wireable constructor: the dependencies it pulls and the
/// build function wiring them together
///
/// ```
/// use std::sync::Arc;
/// use graft_di::{AutoConstruct, ConstructorDescriptor};
///
/// struct Database;
/// struct UserService { db: Arc<Database> }
///
/// impl AutoConstruct for UserService {
///     fn constructor() -> ConstructorDescriptor<Self> {
///         ConstructorDescriptor::new(|registration, context| {
///             Ok(UserService {
///                 db: registration.resolve_dependency::<Database>(context)?,
///             })
///         })
///         .depends_on::<Database>()
///     }
/// }
/// ```
pub struct ConstructorDescriptor<T: Injectable> {
    dependencies: Vec<DependencyBinding>,
    build: Box<dyn Fn(&Registration, &ComponentContext) -> Result<T, DynError> + Send + Sync>,
}

impl<T: Injectable> ConstructorDescriptor<T> {
    pub fn new(
        build: impl Fn(&Registration, &ComponentContext) -> Result<T, DynError> + Send + Sync + 'static,
    ) -> Self {
        ConstructorDescriptor {
            dependencies: Vec::new(),
            build: Box::new(build),
        }
    }

    /// Declares a parameter satisfied by an existing registration
    pub fn depends_on<D: Injectable>(mut self) -> Self {
        self.dependencies.push(DependencyBinding::of::<D>());
        self
    }

    /// Declares a parameter that may itself be auto-registered on first use
    pub fn depends_on_auto<D: AutoConstruct>(mut self) -> Self {
        self.dependencies.push(DependencyBinding::auto::<D>());
        self
    }

    pub(crate) fn into_registration(self) -> Registration {
        let mut builder = RegistrationBuilder::<T>::describe();
        for binding in self.dependencies {
            builder = builder.with_dependency(binding);
        }
        let build = self.build;
        builder
            .construct_with(move |registration, context| build(registration, context))
            .build()
    }
}
