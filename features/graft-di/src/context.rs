use std::{cell::RefCell, sync::Arc};

use parking_lot::ReentrantMutex;

use crate::{
    activation::{ResolutionContext, ResolutionState},
    auto::AutoConstruct,
    errors::ResolveError,
    registration::RegistrationContext,
    registry::RegistrationScope,
    types::{Injectable, Instance, TypeKey},
};

/// The resolution engine
///
/// Given a type, locates or lazily constructs an instance of it, recursively
/// satisfying the dependencies its factory asks for. The critical section
/// from registration selection through lifetime-scope invocation runs under a
/// re-entrant lock: factories may resolve their own dependencies on the same
/// thread, and concurrent first use of a singleton still constructs exactly
/// once. Resolution is serialized process-wide, a deliberate trade-off for an
/// assembly-time activity.
pub struct ComponentContext {
    registry: Arc<RegistrationScope>,
    // RefCell under the re-entrant lock: borrows are short and never held
    // across a factory call
    resolution: ReentrantMutex<RefCell<ResolutionState>>,
}

impl Default for ComponentContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentContext {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(RegistrationScope::new()))
    }

    pub fn with_registry(registry: Arc<RegistrationScope>) -> Self {
        ComponentContext {
            registry,
            resolution: ReentrantMutex::new(RefCell::new(ResolutionState::default())),
        }
    }

    pub fn registry(&self) -> &RegistrationScope {
        &self.registry
    }

    /// Appends a registration; later registrations shadow earlier ones for
    /// singular resolution without removing them
    pub fn add_registration(&self, registration: RegistrationContext) {
        self.registry.add_registration(registration);
    }

    /// Resolves an instance of `T` from the last matching registration
    ///
    /// `Ok(None)` means nothing is registered for `T` or its factory declined
    /// to produce; both are normal outcomes, not errors.
    pub fn resolve<T: Injectable>(&self) -> Result<Option<Arc<T>>, ResolveError> {
        match self.resolve_instance(TypeKey::of::<T>())? {
            Some(instance) => downcast::<T>(instance).map(Some),
            None => Ok(None),
        }
    }

    /// Resolves one instance from every registration for `T`, in
    /// registration order
    ///
    /// Returns an empty sequence when nothing is registered; never triggers
    /// auto-registration. Declining factories are skipped. Singleton
    /// registrations among the candidates still share their cached instance.
    pub fn resolve_all<T: Injectable>(&self) -> Result<Vec<Arc<T>>, ResolveError> {
        let key = TypeKey::of::<T>();
        let mut instances = Vec::new();
        for registration in self.registry.registrations_for(key) {
            if let Some(instance) = self.produce(key, &registration)? {
                instances.push(downcast::<T>(instance)?);
            }
        }
        Ok(instances)
    }

    /// Resolves `T`, synthesizing a registration from its declared
    /// constructor when none exists yet
    ///
    /// The synthesized registration is inserted once and resolution is
    /// retried exactly once; a second failure is final.
    pub fn resolve_auto<T: AutoConstruct>(&self) -> Result<Option<Arc<T>>, ResolveError> {
        match self.resolve_auto_instance::<T>()? {
            Some(instance) => downcast::<T>(instance).map(Some),
            None => Ok(None),
        }
    }

    /// Type-erased singular resolution, used by bound dependency factories
    pub fn resolve_instance(&self, key: TypeKey) -> Result<Option<Instance>, ResolveError> {
        let candidates = self.registry.registrations_for(key);
        // Most recently added wins
        let Some(selected) = candidates.last() else {
            return Ok(None);
        };
        self.produce(key, selected)
    }

    pub(crate) fn resolve_auto_instance<T: AutoConstruct>(
        &self,
    ) -> Result<Option<Instance>, ResolveError> {
        let key = TypeKey::of::<T>();
        if let Some(instance) = self.resolve_instance(key)? {
            return Ok(Some(instance));
        }
        self.register_constructor::<T>();
        self.resolve_instance(key)
    }

    /// Inserts the synthesized registration for `T` unless one appeared in
    /// the meantime
    fn register_constructor<T: AutoConstruct>(&self) {
        let key = TypeKey::of::<T>();
        // Same lock as resolution, so two threads racing the first use of an
        // auto-constructible type insert a single registration
        let _serialized = self.resolution.lock();
        if self.registry.is_registered(key) {
            return;
        }
        tracing::debug!("Auto-registering {}", key);
        self.registry
            .add_registration(RegistrationContext::transient(
                T::constructor().into_registration(),
            ));
    }

    /// Delegates instance production to the registration's lifetime scope
    /// under the re-entrant lock
    fn produce(
        &self,
        key: TypeKey,
        registration: &RegistrationContext,
    ) -> Result<Option<Instance>, ResolveError> {
        let guard = self.resolution.lock();
        let state: &RefCell<ResolutionState> = &guard;

        // The memo lives for one top-level call tree; drop-driven so failed
        // resolves reset it too
        let _reset = MemoReset {
            state,
            top_level: state.borrow().stack.is_empty(),
        };

        let resolution = ResolutionContext::new(self, state);
        registration
            .scope()
            .get_or_create_component(key, registration.registration(), &resolution)
    }
}

fn downcast<T: Injectable>(instance: Instance) -> Result<Arc<T>, ResolveError> {
    instance
        .downcast::<T>()
        .map_err(|actual| ResolveError::WrongInstanceType {
            required: std::any::type_name::<T>(),
            actual,
        })
}

struct MemoReset<'a> {
    state: &'a RefCell<ResolutionState>,
    top_level: bool,
}

impl Drop for MemoReset<'_> {
    fn drop(&mut self) {
        if self.top_level {
            self.state.borrow_mut().memo.clear();
        }
    }
}
