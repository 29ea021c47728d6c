//! Object store trait definition.

use crate::error::StorageResult;
use std::collections::BTreeMap;

/// A named object held by an [`ObjectStore`].
///
/// The store does not interpret `metadata` or `data`; catsplit owns the
/// mapping between descriptors and stored objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    /// Unique object name.
    pub name: String,
    /// String metadata (annotations, labels, owner reference fields).
    pub metadata: BTreeMap<String, String>,
    /// Opaque payload bytes.
    pub data: Vec<u8>,
    /// Revision assigned by the store; ignored on write.
    pub revision: u64,
}

impl StoredObject {
    /// Creates an object with empty metadata.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            metadata: BTreeMap::new(),
            data,
            revision: 0,
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A flat namespace of named objects.
///
/// Stores are **opaque**: they keep whatever metadata and bytes they are
/// given and know nothing about partitions, encodings or ordinals.
///
/// # Invariants
///
/// - `create` fails with `AlreadyExists` if the name is taken
/// - `update` fails with `NotFound` if the name is free, and replaces the
///   whole object (stale metadata does not survive)
/// - every successful write returns a revision greater than any previous one
/// - `list` returns names in ascending order
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::DirectoryStore`] - One directory per object on disk
pub trait ObjectStore: Send + Sync {
    /// Fetches an object by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the object exists but cannot be read.
    fn get(&self, name: &str) -> StorageResult<Option<StoredObject>>;

    /// Creates a new object and returns its revision.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the name is taken, or an I/O error.
    fn create(&mut self, object: &StoredObject) -> StorageResult<u64>;

    /// Replaces an existing object and returns its new revision.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is nothing to replace, or an I/O error.
    fn update(&mut self, object: &StoredObject) -> StorageResult<u64>;

    /// Deletes an object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is nothing to delete, or an I/O error.
    fn delete(&mut self, name: &str) -> StorageResult<()>;

    /// Lists object names starting with `prefix`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
}
