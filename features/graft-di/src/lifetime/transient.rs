use std::sync::Arc;

use crate::{
    activation::ResolutionContext,
    errors::ResolveError,
    lifetime::LifetimeScope,
    registration::Registration,
    types::{Instance, TypeKey},
};

/// Invokes the factory on every resolve, never caches
pub struct TransientScope;

impl LifetimeScope for TransientScope {
    fn get_or_create_component(
        &self,
        key: TypeKey,
        registration: &Arc<Registration>,
        resolution: &ResolutionContext<'_>,
    ) -> Result<Option<Instance>, ResolveError> {
        resolution.activate(key, registration)
    }
}
