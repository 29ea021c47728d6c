//! # catsplit Testkit
//!
//! Test utilities for catsplit.
//!
//! This crate provides:
//! - Sample and seeded random catalogs
//! - Property-based test generators using proptest
//! - Fault injecting store wrappers
//! - Temporary directory stores
//!
//! ## Usage
//!
//! ```rust
//! use catsplit_core::{DescriptorBuilder, PartitionConfig, Partitioner};
//! use catsplit_testkit::prelude::*;
//!
//! let catalog = random_catalog(42, 64 * 1024);
//! let output = Partitioner::new(PartitionConfig::new().max_object_size(16 * 1024))
//!     .unwrap()
//!     .build(&catalog, &DescriptorBuilder::new("fixture"))
//!     .unwrap();
//! assert!(output.descriptors.len() > 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
