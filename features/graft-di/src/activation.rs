use std::{cell::RefCell, collections::HashMap, sync::Arc};

use crate::{
    context::ComponentContext,
    errors::ResolveError,
    registration::Registration,
    types::{Instance, TypeKey},
};

/// Identity of a registration for in-flight tracking
type RegistrationId = usize;

fn registration_id(registration: &Arc<Registration>) -> RegistrationId {
    Arc::as_ptr(registration) as RegistrationId
}

/// Stack of resolutions currently in progress on this top-level resolve
///
/// Pushing a pair that is already present signals a cycle. Frames are popped
/// on every exit path, so the stack never leaks into a later resolve.
#[derive(Default)]
pub struct ActivationStack {
    frames: Vec<(TypeKey, RegistrationId)>,
}

impl ActivationStack {
    fn contains(&self, key: TypeKey, id: RegistrationId) -> bool {
        self.frames.iter().any(|frame| *frame == (key, id))
    }

    fn push(&mut self, key: TypeKey, id: RegistrationId) {
        self.frames.push((key, id));
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn keys(&self) -> Vec<TypeKey> {
        self.frames.iter().map(|(key, _)| *key).collect()
    }
}

/// Mutable state threaded through one resolution, guarded by the engine's
/// re-entrant lock
#[derive(Default)]
pub(crate) struct ResolutionState {
    pub(crate) stack: ActivationStack,
    /// Instances activated during the current top-level call, keyed by
    /// registration identity so multiple registrations for one key never
    /// cross-share
    pub(crate) memo: HashMap<(TypeKey, RegistrationId), Instance>,
}

/// Per-resolve view over the engine's activation state
///
/// Lifetime scopes drive factory invocation through [`activate`] and may
/// consult the same-call memo so sibling dependencies share a still-fresh
/// instance.
///
/// [`activate`]: ResolutionContext::activate
pub struct ResolutionContext<'a> {
    context: &'a ComponentContext,
    state: &'a RefCell<ResolutionState>,
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(context: &'a ComponentContext, state: &'a RefCell<ResolutionState>) -> Self {
        ResolutionContext { context, state }
    }

    /// Invokes the registration's factory with cycle protection
    ///
    /// The activation frame is released on every exit path, including factory
    /// failure and unwinding.
    pub fn activate(
        &self,
        key: TypeKey,
        registration: &Arc<Registration>,
    ) -> Result<Option<Instance>, ResolveError> {
        let id = registration_id(registration);
        {
            let mut state = self.state.borrow_mut();
            if state.stack.contains(key, id) {
                let chain = state.stack.keys();
                tracing::error!("Circular dependency while activating {}", key);
                return Err(ResolveError::CircularDependency { key, chain });
            }
            state.stack.push(key, id);
        }

        // The borrow must not be held here: the factory re-enters the engine
        let _frame = FrameGuard { state: self.state };
        tracing::debug!("Activating {}", key);
        registration.activate(self.context)
    }

    pub fn memoized(&self, key: TypeKey, registration: &Arc<Registration>) -> Option<Instance> {
        self.state
            .borrow()
            .memo
            .get(&(key, registration_id(registration)))
            .cloned()
    }

    pub fn memoize(&self, key: TypeKey, registration: &Arc<Registration>, instance: Instance) {
        self.state
            .borrow_mut()
            .memo
            .insert((key, registration_id(registration)), instance);
    }
}

struct FrameGuard<'a> {
    state: &'a RefCell<ResolutionState>,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_detects_reentered_pairs() {
        let mut stack = ActivationStack::default();
        let key = TypeKey::of::<u32>();
        stack.push(key, 1);
        assert!(stack.contains(key, 1));
        assert!(!stack.contains(key, 2));
        assert!(!stack.contains(TypeKey::of::<String>(), 1));
        stack.pop();
        assert!(stack.is_empty());
    }
}
