use std::{collections::HashMap, sync::Arc};

use crate::{
    auto::AutoConstruct,
    context::ComponentContext,
    errors::ResolveError,
    lifetime::{LifetimeScope, ProvidedInstanceScope, SingletonScope, TransientScope},
    types::{DynError, Injectable, Instance, TypeKey},
};

/// Type-erased factory producing one component
///
/// `Ok(None)` means the factory declined to produce; it is a normal outcome
/// and never cached.
pub type ComponentFactory =
    Arc<dyn Fn(&Registration, &ComponentContext) -> Result<Option<Instance>, ResolveError> + Send + Sync>;

/// A sub-factory bound to one declared dependency of a registration
pub type DependencyFactory =
    Arc<dyn Fn(&ComponentContext) -> Result<Option<Instance>, ResolveError> + Send + Sync>;

/// Describes how to produce instances of one type
///
/// Immutable once built; owned by the registry and referenced during resolves.
pub struct Registration {
    key: TypeKey,
    factory: ComponentFactory,
    dependency_factories: HashMap<TypeKey, DependencyFactory>,
}

impl Registration {
    /// The key this registration produces instances for
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub(crate) fn activate(
        &self,
        context: &ComponentContext,
    ) -> Result<Option<Instance>, ResolveError> {
        (self.factory)(self, context)
    }

    /// Returns the bound sub-factory for one declared dependency, if any
    pub fn dependency_factory(&self, key: TypeKey) -> Option<DependencyFactory> {
        self.dependency_factories.get(&key).cloned()
    }

    /// Produces one declared dependency through its bound factory
    ///
    /// An unbound dependency, or a bound factory that yields nothing, is
    /// escalated as [`ResolveError::MissingDependency`] for this registration.
    pub fn resolve_dependency<D: Injectable>(
        &self,
        context: &ComponentContext,
    ) -> Result<Arc<D>, ResolveError> {
        let dependency = TypeKey::of::<D>();
        let missing = || ResolveError::MissingDependency {
            dependency,
            required_by: self.key,
        };

        let factory = self.dependency_factory(dependency).ok_or_else(missing)?;
        let instance = factory(context)?.ok_or_else(missing)?;
        instance
            .downcast::<D>()
            .map_err(|actual| ResolveError::WrongInstanceType {
                required: dependency.type_name,
                actual,
            })
    }
}

/// One declared dependency of a registration, paired with the factory that
/// supplies it
pub struct DependencyBinding {
    pub(crate) key: TypeKey,
    pub(crate) factory: DependencyFactory,
}

impl DependencyBinding {
    /// Binds a dependency satisfied only by an existing registration
    pub fn of<D: Injectable>() -> Self {
        DependencyBinding {
            key: TypeKey::of::<D>(),
            factory: Arc::new(|context| context.resolve_instance(TypeKey::of::<D>())),
        }
    }

    /// Binds a dependency that may be auto-registered on first use
    pub fn auto<D: AutoConstruct>() -> Self {
        DependencyBinding {
            key: TypeKey::of::<D>(),
            factory: Arc::new(|context| context.resolve_auto_instance::<D>()),
        }
    }
}

/// Builds a [`Registration`] from a type identity, a factory and the
/// dependency bindings the factory may pull from
pub struct RegistrationBuilder<T: Injectable> {
    factory: Option<ComponentFactory>,
    dependency_factories: HashMap<TypeKey, DependencyFactory>,
    _type: std::marker::PhantomData<fn() -> T>,
}

impl<T: Injectable> RegistrationBuilder<T> {
    pub fn describe() -> Self {
        RegistrationBuilder {
            factory: None,
            dependency_factories: HashMap::new(),
            _type: std::marker::PhantomData,
        }
    }

    /// Sets a factory that always produces an instance or fails
    pub fn construct_with<F>(self, factory: F) -> Self
    where
        F: Fn(&Registration, &ComponentContext) -> Result<T, DynError> + Send + Sync + 'static,
    {
        self.construct_optional_with(move |registration, context| {
            factory(registration, context).map(Some)
        })
    }

    /// Sets a factory that may decline to produce by returning `Ok(None)`
    pub fn construct_optional_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Registration, &ComponentContext) -> Result<Option<T>, DynError> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(move |registration, context| {
            match factory(registration, context) {
                Ok(produced) => Ok(produced.map(Instance::new)),
                // Nested resolution failures pass through untouched so a cycle
                // detected deep in the graph keeps its own error kind
                Err(error) => match error.downcast::<ResolveError>() {
                    Ok(resolve_error) => Err(*resolve_error),
                    Err(other) => Err(ResolveError::ConstructionFailed {
                        type_name: std::any::type_name::<T>(),
                        error: Arc::new(other),
                    }),
                },
            }
        }));
        self
    }

    pub fn with_dependency(mut self, binding: DependencyBinding) -> Self {
        self.dependency_factories.insert(binding.key, binding.factory);
        self
    }

    pub fn depends_on<D: Injectable>(self) -> Self {
        self.with_dependency(DependencyBinding::of::<D>())
    }

    pub fn build(self) -> Registration {
        let factory = self.factory.unwrap_or_else(|| {
            tracing::warn!(
                "Registration for {} has no factory - it will decline to produce",
                std::any::type_name::<T>()
            );
            Arc::new(|_: &Registration, _: &ComponentContext| Ok(None))
        });

        Registration {
            key: TypeKey::of::<T>(),
            factory,
            dependency_factories: self.dependency_factories,
        }
    }
}

/// Pairs a registration with the lifetime scope holding its caching policy
///
/// Created once at registration time and lives as long as the registry.
pub struct RegistrationContext {
    registration: Arc<Registration>,
    scope: Arc<dyn LifetimeScope>,
}

impl RegistrationContext {
    pub fn new(registration: Registration, scope: impl LifetimeScope + 'static) -> Self {
        RegistrationContext {
            registration: Arc::new(registration),
            scope: Arc::new(scope),
        }
    }

    /// At most one instance, constructed on first use
    pub fn singleton(registration: Registration) -> Self {
        Self::new(registration, SingletonScope::new())
    }

    /// A fresh instance on every resolve
    pub fn transient(registration: Registration) -> Self {
        Self::new(registration, TransientScope)
    }

    /// Registers an already constructed component
    pub fn instance<T: Injectable>(instance: T) -> Self {
        let provided = Instance::new(instance);
        let scope = ProvidedInstanceScope::new(provided.clone());
        let registration = Registration {
            key: provided.key,
            factory: Arc::new(move |_, _| Ok(Some(provided.clone()))),
            dependency_factories: HashMap::new(),
        };
        RegistrationContext {
            registration: Arc::new(registration),
            scope: Arc::new(scope),
        }
    }

    pub fn key(&self) -> TypeKey {
        self.registration.key()
    }

    pub(crate) fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }

    pub(crate) fn scope(&self) -> &Arc<dyn LifetimeScope> {
        &self.scope
    }
}
