use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, TypeKey};

/// Errors while resolving a component
///
/// The absence of a registration is not an error - `resolve` models it as
/// `Ok(None)` and `resolve_all` as an empty sequence.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// A registration was re-entered while still being activated
    #[error("A circular dependency exists on '{key}' through [{}]", display_chain(.chain))]
    CircularDependency { key: TypeKey, chain: Vec<TypeKey> },

    /// A factory failed while producing an instance
    #[error("Factory for '{type_name}' failed - error: {error:?}")]
    ConstructionFailed {
        type_name: &'static str,
        error: Arc<DynError>,
    },

    /// A registration was asked for a dependency it cannot supply
    #[error("'{required_by}' needs '{dependency}' but no factory could supply it")]
    MissingDependency {
        dependency: TypeKey,
        required_by: TypeKey,
    },

    /// The stored instance does not have the requested type
    #[error("Failed to downcast, required: '{required}' actual: '{actual}'")]
    WrongInstanceType {
        required: &'static str,
        actual: &'static str,
    },
}

fn display_chain(chain: &[TypeKey]) -> String {
    chain
        .iter()
        .map(|key| key.type_name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_names_the_chain() {
        let error = ResolveError::CircularDependency {
            key: TypeKey::of::<u32>(),
            chain: vec![TypeKey::of::<u32>(), TypeKey::of::<String>()],
        };
        let message = error.to_string();
        assert!(message.contains("u32 -> "));
        assert!(message.contains("String"));
    }
}
