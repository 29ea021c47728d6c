//! CLI command implementations.

pub mod inspect;
pub mod plan;
pub mod split;
pub mod unpack;
pub mod verify;

use catsplit_core::{load_descriptors, StorageObjectDescriptor};
use catsplit_storage::DirectoryStore;
use std::path::Path;

/// Loads the partition set `name` from an existing directory store.
pub(crate) fn load_set(
    dir: &Path,
    name: &str,
) -> Result<Vec<StorageObjectDescriptor>, Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("No partition store found at {:?}", dir).into());
    }
    let store = DirectoryStore::open(dir)?;
    let descriptors = load_descriptors(&store, name)?;
    if descriptors.is_empty() {
        return Err(format!("No partitions named {name} found in {:?}", dir).into());
    }
    Ok(descriptors)
}
