//! Test fixtures and store helpers.
//!
//! Provides sample catalogs, seeded random catalogs that compress poorly,
//! and a directory store that cleans up after itself.

use catsplit_codec::{gzip, DEFAULT_LEVEL};
use catsplit_storage::DirectoryStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tempfile::TempDir;

/// A small file-based catalog with a package, a channel and two bundles.
pub const SAMPLE_CATALOG: &str = r#"---
schema: olm.package
name: etcd
defaultChannel: stable
---
schema: olm.channel
package: etcd
name: stable
entries:
  - name: etcd.v0.9.2
  - name: etcd.v0.9.4
    replaces: etcd.v0.9.2
---
schema: olm.bundle
name: etcd.v0.9.2
package: etcd
image: quay.io/operatorhubio/etcd:v0.9.2
properties:
  - type: olm.package
    value:
      packageName: etcd
      version: 0.9.2
---
schema: olm.bundle
name: etcd.v0.9.4
package: etcd
image: quay.io/operatorhubio/etcd:v0.9.4
properties:
  - type: olm.package
    value:
      packageName: etcd
      version: 0.9.4
"#;

/// Number of documents in [`SAMPLE_CATALOG`].
pub const SAMPLE_DOCUMENTS: usize = 4;

const CHAR_TABLE: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_+=*&^%$#@!,.;~/\\|";

/// Generates one random YAML document: 5 to 49 fields with lowercase names
/// and quoted values drawn from a wide character table.
pub fn random_document(rng: &mut impl Rng) -> String {
    let fields = rng.gen_range(5..50);
    let mut doc = String::new();
    for _ in 0..fields {
        let name_len = rng.gen_range(5..20);
        let name: String = (0..name_len)
            .map(|_| char::from(CHAR_TABLE[rng.gen_range(0..26)]))
            .collect();
        let value_len = rng.gen_range(5..45);
        let value: String = (0..value_len)
            .map(|_| char::from(CHAR_TABLE[rng.gen_range(0..CHAR_TABLE.len())]))
            .collect();
        doc.push_str(&format!("{name}: {value:?}\n"));
    }
    doc
}

/// Generates a random catalog of at least `min_len` bytes, each document
/// introduced by a `---` line. The same seed gives the same catalog.
pub fn random_catalog(seed: u64, min_len: usize) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut catalog = String::with_capacity(min_len + 4096);
    while catalog.len() < min_len {
        catalog.push_str("---\n");
        catalog.push_str(&random_document(&mut rng));
    }
    catalog
}

/// Repeats [`SAMPLE_CATALOG`] until the result is at least `min_len` bytes.
///
/// Repetition compresses very well, so this stays in one partition far past
/// the uncompressed limit.
pub fn repeated_catalog(min_len: usize) -> String {
    let mut catalog = String::with_capacity(min_len + SAMPLE_CATALOG.len());
    while catalog.len() < min_len {
        catalog.push_str(SAMPLE_CATALOG);
    }
    catalog
}

/// Returns the gzip size of `text` compressed in one pass.
pub fn gzip_size(text: &str) -> usize {
    gzip(text.as_bytes(), DEFAULT_LEVEL)
        .map(|payload| payload.len())
        .expect("in-memory gzip cannot fail")
}

/// A directory store in a temporary directory, removed on drop.
pub struct TempStore {
    /// The store.
    pub store: DirectoryStore,
    _dir: TempDir,
}

impl TempStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = DirectoryStore::open(dir.path()).expect("Failed to open directory store");
        Self { store, _dir: dir }
    }

    /// Returns the store root.
    pub fn path(&self) -> &Path {
        self.store.root()
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_catalog_is_seeded() {
        assert_eq!(random_catalog(5, 10_000), random_catalog(5, 10_000));
        assert_ne!(random_catalog(5, 10_000), random_catalog(6, 10_000));
    }

    #[test]
    fn random_catalog_reaches_length() {
        let catalog = random_catalog(1, 50_000);
        assert!(catalog.len() >= 50_000);
        assert!(catalog.starts_with("---\n"));
    }

    #[test]
    fn random_content_compresses_poorly() {
        let random = random_catalog(2, 100_000);
        let repeated = repeated_catalog(100_000);
        assert!(gzip_size(&random) > gzip_size(&repeated) * 5);
    }

    #[test]
    fn temp_store_exists() {
        let store = TempStore::new();
        assert!(store.path().is_dir());
    }
}
