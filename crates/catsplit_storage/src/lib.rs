//! # catsplit Storage
//!
//! Object store trait and implementations for catsplit.
//!
//! This crate provides the persistence boundary for sealed partitions.
//! Stores are **opaque name → object maps**: they do not interpret the
//! metadata or payload they hold.
//!
//! ## Design Principles
//!
//! - Stores offer get, create, update, delete and prefix listing
//! - No knowledge of partitions, encodings or ordinals
//! - Must be `Send + Sync`
//! - Errors say whether a retry may succeed ([`StorageError::is_retryable`])
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and dry runs
//! - [`DirectoryStore`] - One directory per object on disk
//!
//! ## Example
//!
//! ```rust
//! use catsplit_storage::{InMemoryStore, ObjectStore, StoredObject};
//!
//! let mut store = InMemoryStore::new();
//! store.create(&StoredObject::new("a", b"hello".to_vec())).unwrap();
//! assert_eq!(store.get("a").unwrap().unwrap().data, b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod directory;
mod error;
mod memory;

pub use backend::{ObjectStore, StoredObject};
pub use directory::{DirectoryStore, DATA_FILE, METADATA_FILE};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStore;
