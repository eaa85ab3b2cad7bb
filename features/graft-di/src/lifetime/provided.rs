use std::sync::Arc;

use crate::{
    activation::ResolutionContext,
    errors::ResolveError,
    lifetime::LifetimeScope,
    registration::Registration,
    types::{Instance, TypeKey},
};

/// Hands out an instance that was constructed before registration
///
/// The paired factory is never invoked through this scope.
pub struct ProvidedInstanceScope {
    component: Instance,
}

impl ProvidedInstanceScope {
    pub fn new(component: Instance) -> Self {
        ProvidedInstanceScope { component }
    }
}

impl LifetimeScope for ProvidedInstanceScope {
    fn get_or_create_component(
        &self,
        _key: TypeKey,
        _registration: &Arc<Registration>,
        _resolution: &ResolutionContext<'_>,
    ) -> Result<Option<Instance>, ResolveError> {
        Ok(Some(self.component.clone()))
    }
}
