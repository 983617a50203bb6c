//! In-memory descriptor provider.

use std::sync::Arc;

use dashmap::DashMap;

use super::descriptor::{Entity, EntityDescriptor};
use crate::error::{DataError, DataResult};

/// Supplies descriptors by entity name.
///
/// The cache only reads through this trait, so descriptors can come from a
/// static registration table, generated code or a loaded file.
pub trait DescriptorProvider: Send + Sync {
    fn descriptor(&self, entity: &str) -> DataResult<Arc<EntityDescriptor>>;
}

/// Concurrent registry of descriptors, populated at startup.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    descriptors: DashMap<String, Arc<EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type that describes itself.
    pub fn register<T: Entity>(&self) -> &Self {
        self.register_descriptor(T::descriptor())
    }

    /// Register a descriptor under its own name, replacing any previous one.
    pub fn register_descriptor(&self, descriptor: EntityDescriptor) -> &Self {
        self.descriptors
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        self
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.descriptors.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl DescriptorProvider for EntityRegistry {
    fn descriptor(&self, entity: &str) -> DataResult<Arc<EntityDescriptor>> {
        self.descriptors
            .get(entity)
            .map(|d| Arc::clone(d.value()))
            .ok_or_else(|| DataError::UnknownEntity(entity.to_string()))
    }
}
