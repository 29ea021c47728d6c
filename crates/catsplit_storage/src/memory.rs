//! In-memory object store for testing.

use crate::backend::{ObjectStore, StoredObject};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory object store.
///
/// Suitable for unit tests, integration tests and dry runs.
///
/// # Example
///
/// ```rust
/// use catsplit_storage::{InMemoryStore, ObjectStore, StoredObject};
///
/// let mut store = InMemoryStore::new();
/// store.create(&StoredObject::new("catalog-partition-1", b"data".to_vec())).unwrap();
/// assert_eq!(store.list("catalog-").unwrap(), vec!["catalog-partition-1"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    revision: RwLock<u64>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if the store holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn next_revision(&self) -> u64 {
        let mut revision = self.revision.write();
        *revision += 1;
        *revision
    }
}

impl ObjectStore for InMemoryStore {
    fn get(&self, name: &str) -> StorageResult<Option<StoredObject>> {
        Ok(self.objects.read().get(name).cloned())
    }

    fn create(&mut self, object: &StoredObject) -> StorageResult<u64> {
        let mut objects = self.objects.write();
        if objects.contains_key(&object.name) {
            return Err(StorageError::AlreadyExists {
                name: object.name.clone(),
            });
        }

        let revision = self.next_revision();
        let mut stored = object.clone();
        stored.revision = revision;
        objects.insert(object.name.clone(), stored);
        Ok(revision)
    }

    fn update(&mut self, object: &StoredObject) -> StorageResult<u64> {
        let mut objects = self.objects.write();
        let Some(slot) = objects.get_mut(&object.name) else {
            return Err(StorageError::NotFound {
                name: object.name.clone(),
            });
        };

        let revision = self.next_revision();
        *slot = object.clone();
        slot.revision = revision;
        Ok(revision)
    }

    fn delete(&mut self, name: &str) -> StorageResult<()> {
        match self.objects.write().remove(name) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .objects
            .read()
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }
}
