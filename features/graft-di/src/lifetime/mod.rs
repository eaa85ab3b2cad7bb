use std::sync::Arc;

use crate::{
    activation::ResolutionContext, errors::ResolveError, registration::Registration,
    types::{Instance, TypeKey},
};

pub mod provided;
pub mod singleton;
pub mod transient;

pub use provided::ProvidedInstanceScope;
pub use singleton::SingletonScope;
pub use transient::TransientScope;

/// Per-registration caching policy
///
/// The engine only depends on this produce-or-reuse contract; policies decide
/// whether to invoke the factory again or hand back a previous instance.
/// `Ok(None)` means the factory declined to produce and must never be cached.
pub trait LifetimeScope: Send + Sync {
    fn get_or_create_component(
        &self,
        key: TypeKey,
        registration: &Arc<Registration>,
        resolution: &ResolutionContext<'_>,
    ) -> Result<Option<Instance>, ResolveError>;
}
