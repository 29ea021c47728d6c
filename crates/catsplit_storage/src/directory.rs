//! Directory-backed object store for persistent storage.

use crate::backend::{ObjectStore, StoredObject};
use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File holding an object's metadata.
pub const METADATA_FILE: &str = "object.json";

/// File holding an object's payload.
pub const DATA_FILE: &str = "data";

#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    name: String,
    revision: u64,
    size: u64,
    metadata: BTreeMap<String, String>,
}

/// An object store that keeps one directory per object.
///
/// Layout under the root:
///
/// ```text
/// <root>/<name>/object.json   metadata, revision and payload size
/// <root>/<name>/data          payload bytes
/// ```
///
/// Files are written to a temporary name and renamed into place, so a reader
/// never observes a half-written payload. The payload is written before the
/// metadata; an object only exists once its metadata file does.
///
/// # Example
///
/// ```no_run
/// use catsplit_storage::{DirectoryStore, ObjectStore, StoredObject};
/// use std::path::Path;
///
/// let mut store = DirectoryStore::open(Path::new("out")).unwrap();
/// store.create(&StoredObject::new("catalog-partition-1", vec![1, 2, 3])).unwrap();
/// ```
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding the named object.
    #[must_use]
    pub fn object_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn checked_dir(&self, name: &str) -> StorageResult<PathBuf> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.object_dir(name))
    }

    fn read_meta(dir: &Path) -> StorageResult<Option<ObjectMeta>> {
        let bytes = match fs::read(dir.join(METADATA_FILE)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let meta = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::Corrupted(format!("{}: {}", dir.join(METADATA_FILE).display(), e))
        })?;
        Ok(Some(meta))
    }

    fn write(&self, dir: &Path, object: &StoredObject, revision: u64) -> StorageResult<()> {
        fs::create_dir_all(dir)?;
        write_atomic(&dir.join(DATA_FILE), &object.data)?;

        let meta = ObjectMeta {
            name: object.name.clone(),
            revision,
            size: object.data.len() as u64,
            metadata: object.metadata.clone(),
        };
        let json = serde_json::to_vec_pretty(&meta)
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;
        write_atomic(&dir.join(METADATA_FILE), &json)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

impl ObjectStore for DirectoryStore {
    fn get(&self, name: &str) -> StorageResult<Option<StoredObject>> {
        let dir = self.checked_dir(name)?;
        let Some(meta) = Self::read_meta(&dir)? else {
            return Ok(None);
        };

        let data = fs::read(dir.join(DATA_FILE))?;
        if data.len() as u64 != meta.size {
            return Err(StorageError::Corrupted(format!(
                "{}: payload is {} bytes, metadata says {}",
                name,
                data.len(),
                meta.size
            )));
        }

        Ok(Some(StoredObject {
            name: meta.name,
            metadata: meta.metadata,
            data,
            revision: meta.revision,
        }))
    }

    fn create(&mut self, object: &StoredObject) -> StorageResult<u64> {
        let dir = self.checked_dir(&object.name)?;
        if Self::read_meta(&dir)?.is_some() {
            return Err(StorageError::AlreadyExists {
                name: object.name.clone(),
            });
        }

        self.write(&dir, object, 1)?;
        Ok(1)
    }

    fn update(&mut self, object: &StoredObject) -> StorageResult<u64> {
        let dir = self.checked_dir(&object.name)?;
        let Some(existing) = Self::read_meta(&dir)? else {
            return Err(StorageError::NotFound {
                name: object.name.clone(),
            });
        };

        let revision = existing.revision + 1;
        self.write(&dir, object, revision)?;
        Ok(revision)
    }

    fn delete(&mut self, name: &str) -> StorageResult<()> {
        let dir = self.checked_dir(name)?;
        if Self::read_meta(&dir)?.is_none() {
            return Err(StorageError::NotFound {
                name: name.to_string(),
            });
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with(prefix) && entry.path().join(METADATA_FILE).exists() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn object(name: &str, data: &[u8]) -> StoredObject {
        StoredObject::new(name, data.to_vec())
    }

    #[test]
    fn directory_create_and_get() {
        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();

        let revision = store
            .create(&object("cat-partition-1", b"payload").with_metadata("k", "v"))
            .unwrap();
        assert_eq!(revision, 1);

        let fetched = store.get("cat-partition-1").unwrap().unwrap();
        assert_eq!(fetched.data, b"payload");
        assert_eq!(fetched.metadata.get("k").map(String::as_str), Some("v"));
        assert!(dir.path().join("cat-partition-1").join(DATA_FILE).exists());
    }

    #[test]
    fn directory_get_missing() {
        let dir = tempdir().unwrap();
        let store = DirectoryStore::open(dir.path()).unwrap();
        assert!(store.get("nothing").unwrap().is_none());
    }

    #[test]
    fn directory_create_twice_fails() {
        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();
        store.create(&object("a", b"1")).unwrap();
        assert!(matches!(
            store.create(&object("a", b"2")),
            Err(StorageError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn directory_update_bumps_revision() {
        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();
        store.create(&object("a", b"1").with_metadata("old", "x")).unwrap();

        let revision = store.update(&object("a", b"22")).unwrap();
        assert_eq!(revision, 2);

        let fetched = store.get("a").unwrap().unwrap();
        assert_eq!(fetched.data, b"22");
        assert!(fetched.metadata.is_empty());
    }

    #[test]
    fn directory_update_missing_fails() {
        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.update(&object("a", b"1")),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn directory_delete_and_list() {
        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();
        store.create(&object("cat-partition-1", b"")).unwrap();
        store.create(&object("cat-partition-2", b"")).unwrap();
        store.create(&object("dog", b"")).unwrap();

        store.delete("cat-partition-2").unwrap();
        assert_eq!(store.list("cat-").unwrap(), vec!["cat-partition-1"]);
        assert_eq!(store.list("").unwrap().len(), 2);
    }

    #[test]
    fn directory_persistence() {
        let dir = tempdir().unwrap();
        {
            let mut store = DirectoryStore::open(dir.path()).unwrap();
            store.create(&object("kept", b"across opens")).unwrap();
        }
        {
            let store = DirectoryStore::open(dir.path()).unwrap();
            let fetched = store.get("kept").unwrap().unwrap();
            assert_eq!(fetched.data, b"across opens");
        }
    }

    #[test]
    fn directory_rejects_bad_names() {
        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();
        for name in ["", "..", "a/b", ".hidden"] {
            assert!(matches!(
                store.create(&object(name, b"")),
                Err(StorageError::InvalidName { .. })
            ));
        }
    }

    #[test]
    fn directory_detects_truncated_payload() {
        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();
        store.create(&object("a", b"full payload")).unwrap();
        fs::write(dir.path().join("a").join(DATA_FILE), b"full").unwrap();

        assert!(matches!(store.get("a"), Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn directory_writes_from_another_thread() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DirectoryStore>();

        let dir = tempdir().unwrap();
        let mut store = DirectoryStore::open(dir.path()).unwrap();
        let handle = std::thread::spawn(move || {
            store.create(&StoredObject::new("a", vec![1])).unwrap();
            store
        });
        let store = handle.join().unwrap();
        assert_eq!(store.get("a").unwrap().unwrap().revision, 1);
    }

    #[test]
    fn directory_open_creates_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("store");
        let store = DirectoryStore::open(&root).unwrap();
        assert!(root.exists());
        assert_eq!(store.root(), root);
    }
}
