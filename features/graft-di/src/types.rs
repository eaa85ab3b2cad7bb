use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All factory errors are carried as boxed dynamic errors
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Resolution may happen concurrently from multiple threads
/// So anything the engine holds needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type name and type id - the identity used to index the registry
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeKey {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeKey {
    pub fn of<T: 'static + ?Sized>() -> TypeKey {
        TypeKey {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Type-erased handle on a produced component
#[derive(Clone)]
pub struct Instance {
    pub key: TypeKey,
    instance: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Instance {
            key: TypeKey::of::<T>(),
            instance: Arc::new(instance),
        }
    }

    /// Wraps an already shared component without another allocation
    pub fn from_arc<T: Injectable>(instance: Arc<T>) -> Self {
        Instance {
            key: TypeKey::of::<T>(),
            instance,
        }
    }

    /// Recovers the concrete type, reporting the stored type name on mismatch
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.key.type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_of_equal_types_are_equal() {
        assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
        assert_ne!(TypeKey::of::<String>(), TypeKey::of::<u32>());
    }

    #[test]
    fn downcast_to_the_stored_type() {
        let instance = Instance::new(42u32);
        assert_eq!(*instance.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn downcast_mismatch_reports_actual_type() {
        let instance = Instance::new(42u32);
        let actual = instance.downcast::<String>().unwrap_err();
        assert_eq!(actual, std::any::type_name::<u32>());
    }
}
