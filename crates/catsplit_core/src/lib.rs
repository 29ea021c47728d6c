//! # catsplit Core
//!
//! Splits a large catalog into an ordered set of storage objects, each of
//! which stays under a hard size limit once compressed.
//!
//! This crate provides:
//! - Segmentation of raw content into atomic documents
//! - Greedy, order-preserving packing of documents into partitions
//! - Swappable payload encodings (gzip or plain)
//! - Descriptor naming, annotation and ownership tagging
//! - Publishing with retries and stale partition pruning
//! - Reconstruction and mount planning for consumers
//!
//! ## Example
//!
//! ```rust
//! use catsplit_core::{reconstruct, DescriptorBuilder, PartitionConfig, Partitioner};
//!
//! let partitioner = Partitioner::new(PartitionConfig::default()).unwrap();
//! let builder = DescriptorBuilder::new("catalog").with_namespace("olm");
//! let output = partitioner
//!     .build("schema: olm.package\n---\nschema: olm.bundle\n", &builder)
//!     .unwrap();
//!
//! let restored = reconstruct(&output.descriptors, "\n---\n").unwrap();
//! assert_eq!(restored, "schema: olm.package\n---\nschema: olm.bundle");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod descriptor;
mod encoding;
mod error;
mod layout;
mod partitioner;
mod publish;
mod reconstruct;
mod segment;
mod sequencer;
mod stats;

pub use config::{
    PartitionConfig, RetryConfig, DEFAULT_JOINER, DEFAULT_MAX_OBJECT_SIZE, DEFAULT_SEPARATOR,
};
pub use descriptor::{
    parse_ordinal, validate_sequence, DescriptorBuilder, OwnerRef, StorageObjectDescriptor,
    CONTENT_DIGEST_LABEL, PARTITION_COUNT_LABEL, PARTITION_INFIX,
};
pub use encoding::{
    EncodingKind, GzipEncoding, PartitionEncoding, PlainEncoding, CONTENT_ENCODING_ANNOTATION,
    DEFAULT_PAYLOAD_KEY, GZIP_ENCODING, GZIP_SUFFIX,
};
pub use error::{CoreError, CoreResult};
pub use layout::{
    trim_dns_label, volume_name, MountEntry, MountPlan, DEFAULT_MOUNT_ROOT, DEFAULT_OUTPUT_ROOT,
    MAX_LABEL_LEN,
};
pub use partitioner::{content_digest, BuildOutput, Partitioner};
pub use publish::{PublishReport, Publisher};
pub use reconstruct::{decode_payload, load_descriptors, ordered, reconstruct, unpack_to_dir};
pub use segment::{normalize, segment, Segment};
pub use sequencer::{PartitionSequencer, SealedPartition, SequencerState};
pub use stats::PartitionStats;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
