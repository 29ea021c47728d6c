//! Fault injection for object stores.

use catsplit_storage::{ObjectStore, StorageError, StorageResult, StoredObject};
use std::io;

/// Which failure a [`FlakyStore`] injects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The backend is throttling or briefly unavailable. Retryable.
    Unavailable,
    /// A transient I/O timeout. Retryable.
    TimedOut,
    /// A permanent I/O failure. Not retryable.
    PermissionDenied,
}

impl Fault {
    fn to_error(self) -> StorageError {
        match self {
            Fault::Unavailable => StorageError::unavailable("injected fault"),
            Fault::TimedOut => io::Error::new(io::ErrorKind::TimedOut, "injected fault").into(),
            Fault::PermissionDenied => {
                io::Error::new(io::ErrorKind::PermissionDenied, "injected fault").into()
            }
        }
    }
}

/// Wraps a store and fails the next N writes (create, update, delete).
///
/// Reads always pass through.
#[derive(Debug)]
pub struct FlakyStore<S> {
    inner: S,
    fault: Fault,
    remaining: u32,
    injected: u32,
    writes: u32,
}

impl<S: ObjectStore> FlakyStore<S> {
    /// Wraps `inner`, failing the next `failures` writes with `fault`.
    pub fn new(inner: S, fault: Fault, failures: u32) -> Self {
        Self {
            inner,
            fault,
            remaining: failures,
            injected: 0,
            writes: 0,
        }
    }

    /// Schedules more failures.
    pub fn fail_next(&mut self, failures: u32) {
        self.remaining = failures;
    }

    /// Returns how many failures were injected.
    pub fn injected(&self) -> u32 {
        self.injected
    }

    /// Returns how many writes reached the inner store.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn trip(&mut self) -> StorageResult<()> {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.injected += 1;
            return Err(self.fault.to_error());
        }
        self.writes += 1;
        Ok(())
    }
}

impl<S: ObjectStore> ObjectStore for FlakyStore<S> {
    fn get(&self, name: &str) -> StorageResult<Option<StoredObject>> {
        self.inner.get(name)
    }

    fn create(&mut self, object: &StoredObject) -> StorageResult<u64> {
        self.trip()?;
        self.inner.create(object)
    }

    fn update(&mut self, object: &StoredObject) -> StorageResult<u64> {
        self.trip()?;
        self.inner.update(object)
    }

    fn delete(&mut self, name: &str) -> StorageResult<()> {
        self.trip()?;
        self.inner.delete(name)
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsplit_storage::InMemoryStore;

    #[test]
    fn fails_then_passes() {
        let mut store = FlakyStore::new(InMemoryStore::new(), Fault::Unavailable, 2);
        let object = StoredObject::new("a", vec![1]);

        assert!(store.create(&object).unwrap_err().is_retryable());
        assert!(store.create(&object).is_err());
        assert!(store.create(&object).is_ok());
        assert_eq!(store.injected(), 2);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn permission_denied_is_permanent() {
        let mut store = FlakyStore::new(InMemoryStore::new(), Fault::PermissionDenied, 1);
        let err = store.create(&StoredObject::new("a", vec![])).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn reads_pass_through() {
        let mut inner = InMemoryStore::new();
        inner.create(&StoredObject::new("a", vec![])).unwrap();
        let store = FlakyStore::new(inner, Fault::TimedOut, 5);
        assert!(store.get("a").unwrap().is_some());
        assert_eq!(store.list("").unwrap(), vec!["a".to_string()]);
    }
}
