use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::{registration::RegistrationContext, types::TypeKey};

/// The registry mapping each type key to its ordered registrations
///
/// Appending never removes prior entries: the last registration shadows the
/// earlier ones for singular resolution while all of them stay visible to
/// `resolve_all`. The lock makes lazy auto-registration inserts safe against
/// concurrent resolvers.
#[derive(Default)]
pub struct RegistrationScope {
    registrations: RwLock<HashMap<TypeKey, Vec<Arc<RegistrationContext>>>>,
}

impl RegistrationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a registration to the sequence for its key
    pub fn add_registration(&self, context: RegistrationContext) {
        let key = context.key();
        tracing::debug!("Adding registration for {}", key);
        self.registrations
            .write()
            .entry(key)
            .or_default()
            .push(Arc::new(context));
    }

    /// Returns a snapshot of the ordered registrations for `key`
    ///
    /// Pure read; the snapshot is cloned out so no registry lock is held
    /// while instances are constructed.
    pub fn registrations_for(&self, key: TypeKey) -> Vec<Arc<RegistrationContext>> {
        self.registrations
            .read()
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_registered(&self, key: TypeKey) -> bool {
        self.registrations.read().contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{RegistrationBuilder, RegistrationContext};

    #[test]
    fn registrations_keep_insertion_order() {
        let registry = RegistrationScope::new();
        registry.add_registration(RegistrationContext::transient(
            RegistrationBuilder::<u32>::describe()
                .construct_with(|_, _| Ok(1))
                .build(),
        ));
        registry.add_registration(RegistrationContext::transient(
            RegistrationBuilder::<u32>::describe()
                .construct_with(|_, _| Ok(2))
                .build(),
        ));

        let found = registry.registrations_for(TypeKey::of::<u32>());
        assert_eq!(found.len(), 2);
        assert!(registry.is_registered(TypeKey::of::<u32>()));
        assert!(!registry.is_registered(TypeKey::of::<String>()));
    }

    #[test]
    fn lookup_of_unknown_key_is_empty() {
        let registry = RegistrationScope::new();
        assert!(registry.registrations_for(TypeKey::of::<u32>()).is_empty());
    }
}
