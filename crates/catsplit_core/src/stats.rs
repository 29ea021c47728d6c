//! Summary of a partitioning run.

use crate::descriptor::StorageObjectDescriptor;
use crate::encoding::EncodingKind;
use serde::Serialize;

/// Statistics describing a built partition set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionStats {
    /// Payload encoding.
    pub encoding: EncodingKind,
    /// Number of documents.
    pub segments: usize,
    /// Number of partitions.
    pub partitions: usize,
    /// Size of the raw input.
    pub input_bytes: usize,
    /// Size of the normalized content a reconstruction reproduces.
    pub normalized_bytes: usize,
    /// Sum of all payload sizes.
    pub payload_bytes: usize,
    /// Size of the largest descriptor, metadata included.
    pub largest_descriptor: usize,
    /// Storage object size limit.
    pub max_object_size: usize,
}

impl PartitionStats {
    pub(crate) fn collect(
        encoding: EncodingKind,
        segments: usize,
        input_bytes: usize,
        normalized_bytes: usize,
        max_object_size: usize,
        descriptors: &[StorageObjectDescriptor],
    ) -> Self {
        Self {
            encoding,
            segments,
            partitions: descriptors.len(),
            input_bytes,
            normalized_bytes,
            payload_bytes: descriptors.iter().map(|d| d.payload.len()).sum(),
            largest_descriptor: descriptors
                .iter()
                .map(StorageObjectDescriptor::total_size)
                .max()
                .unwrap_or(0),
            max_object_size,
        }
    }

    /// Payload bytes per normalized content byte.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.normalized_bytes == 0 {
            return 1.0;
        }
        self.payload_bytes as f64 / self.normalized_bytes as f64
    }

    /// Fill of the largest descriptor relative to the limit, from 0 to 1.
    #[must_use]
    pub fn peak_utilization(&self) -> f64 {
        if self.max_object_size == 0 {
            return 0.0;
        }
        self.largest_descriptor as f64 / self.max_object_size as f64
    }
}
