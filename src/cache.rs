use std::{
    any::TypeId,
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use prost_reflect::{MessageDescriptor, ReflectMessage};

/// Lazily filled map from a compiled message type to its descriptor.
///
/// Obtaining the descriptor of a compiled type means building its default
/// instance; the cache does that once per type. Entries are never replaced, so
/// a racing insert of the same type keeps whichever descriptor landed first.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    descriptors: RwLock<HashMap<TypeId, MessageDescriptor>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor of `T`, computed from `T::default()` on first use.
    pub fn descriptor<T>(&self) -> MessageDescriptor
    where
        T: ReflectMessage + Default + 'static,
    {
        let id = TypeId::of::<T>();
        if let Some(desc) = self
            .descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return desc.clone();
        }

        let desc = T::default().descriptor();
        tracing::debug!(schema = %desc.full_name(), "caching message descriptor");
        self.descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(desc)
            .clone()
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no type has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_cached_once_per_type() {
        let cache = DescriptorCache::new();
        assert!(cache.is_empty());

        let desc = cache.descriptor::<prost_types::Timestamp>();
        assert_eq!(desc.full_name(), "google.protobuf.Timestamp");
        assert_eq!(cache.descriptor::<prost_types::Timestamp>(), desc);
        assert_eq!(cache.len(), 1);

        cache.descriptor::<prost_types::Duration>();
        assert_eq!(cache.len(), 2);
    }
}
