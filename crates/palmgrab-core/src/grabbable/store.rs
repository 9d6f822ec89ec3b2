//! In-memory grabbable registry.

use super::{Grabbable, GrabbableLookup, ObjectId};
use std::collections::HashMap;
use uuid::Uuid;

/// Owns grabbables keyed by [`ObjectId`].
#[derive(Debug, Clone)]
pub struct GrabbableStore<T> {
    objects: HashMap<ObjectId, T>,
}

impl<T> Default for GrabbableStore<T> {
    fn default() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }
}

impl<T: Grabbable> GrabbableStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object under a fresh id.
    pub fn insert(&mut self, object: T) -> ObjectId {
        let id = Uuid::new_v4();
        self.objects.insert(id, object);
        id
    }

    /// Destroy an object. Outstanding handles stop resolving.
    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        self.objects.remove(&id)
    }

    /// Get an object by id.
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.objects.get(&id)
    }

    /// Get a mutable object by id.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects.get_mut(&id)
    }

    /// Iterate over all objects.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &T)> {
        self.objects.iter().map(|(id, object)| (*id, object))
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<T: Grabbable> GrabbableLookup for GrabbableStore<T> {
    fn grabbable(&self, id: ObjectId) -> Option<&dyn Grabbable> {
        self.objects.get(&id).map(|object| object as &dyn Grabbable)
    }

    fn grabbable_mut(&mut self, id: ObjectId) -> Option<&mut dyn Grabbable> {
        self.objects.get_mut(&id).map(|object| object as &mut dyn Grabbable)
    }
}
