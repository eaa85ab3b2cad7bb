use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    activation::ResolutionContext,
    errors::ResolveError,
    lifetime::LifetimeScope,
    registration::Registration,
    types::{Instance, TypeKey},
};

/// Constructs at most one instance and reuses it on every later resolve
///
/// Only a fully constructed instance is ever cached: a failing or declining
/// factory leaves the cell empty, so a later resolve is free to retry.
#[derive(Default)]
pub struct SingletonScope {
    component: Mutex<Option<Instance>>,
}

impl SingletonScope {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LifetimeScope for SingletonScope {
    fn get_or_create_component(
        &self,
        key: TypeKey,
        registration: &Arc<Registration>,
        resolution: &ResolutionContext<'_>,
    ) -> Result<Option<Instance>, ResolveError> {
        // The cell is never locked across the factory call; the engine's
        // re-entrant lock already serializes first use across threads
        if let Some(existing) = self.component.lock().clone() {
            tracing::debug!("Reusing cached instance of {}", key);
            return Ok(Some(existing));
        }

        // A sibling in the same call tree may have activated this
        // registration already
        if let Some(memoized) = resolution.memoized(key, registration) {
            return Ok(Some(memoized));
        }

        let produced = resolution.activate(key, registration)?;
        if let Some(instance) = &produced {
            *self.component.lock() = Some(instance.clone());
            resolution.memoize(key, registration, instance.clone());
        }
        Ok(produced)
    }
}
