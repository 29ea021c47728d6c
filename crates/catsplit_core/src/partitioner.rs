//! The partitioning pipeline: segment, sequence, build, verify.

use crate::config::PartitionConfig;
use crate::descriptor::{DescriptorBuilder, StorageObjectDescriptor};
use crate::error::{CoreError, CoreResult};
use crate::segment::{normalize, segment};
use crate::sequencer::PartitionSequencer;
use crate::stats::PartitionStats;
use sha2::{Digest, Sha256};
use tracing::info;

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Descriptors ordered by ordinal.
    pub descriptors: Vec<StorageObjectDescriptor>,
    /// SHA-256 of the normalized content, hex encoded.
    pub digest: String,
    /// Run statistics.
    pub stats: PartitionStats,
}

/// Splits catalog content into storage object descriptors that each fit
/// within the configured size limit.
///
/// # Example
///
/// ```rust
/// use catsplit_core::{DescriptorBuilder, PartitionConfig, Partitioner};
///
/// let partitioner = Partitioner::new(PartitionConfig::default()).unwrap();
/// let builder = DescriptorBuilder::new("my-catalog").with_namespace("olm");
/// let output = partitioner.build("a: 1\n---\nb: 2\n", &builder).unwrap();
///
/// assert_eq!(output.descriptors.len(), 1);
/// assert_eq!(output.descriptors[0].name, "my-catalog-partition-1");
/// ```
#[derive(Debug, Clone)]
pub struct Partitioner {
    config: PartitionConfig,
}

impl Partitioner {
    /// Creates a partitioner.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: PartitionConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Builds the descriptor set for `content`.
    ///
    /// Nothing is returned unless every descriptor fits; the first failure
    /// aborts the whole build.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidConfig`] if descriptor metadata alone fills the
    ///   capacity
    /// - [`CoreError::OversizeSegment`] if one document cannot fit in an
    ///   empty partition
    /// - [`CoreError::CapacityExceeded`] if a sealed descriptor is larger
    ///   than the limit
    /// - [`CoreError::Codec`] if the encoder fails
    pub fn build(&self, content: &str, builder: &DescriptorBuilder) -> CoreResult<BuildOutput> {
        let config = &self.config;
        let segments = segment(content, &config.separator);
        let normalized = normalize(content, &config.separator, &config.joiner);
        let digest = content_digest(&normalized);

        let capacity = config.capacity();
        let reserved = builder.overhead(config.encoding);
        if reserved >= capacity {
            return Err(CoreError::invalid_config(format!(
                "descriptor metadata needs {reserved} bytes, leaving no room within {capacity}"
            )));
        }

        let mut encoding = config.encoding.boxed(config.level, capacity);
        let partitions =
            PartitionSequencer::run(encoding.as_mut(), &config.joiner, reserved, &segments)?;
        let descriptors = builder.build(encoding.as_ref(), partitions, &digest);

        for descriptor in &descriptors {
            let size = descriptor.total_size();
            if size > config.max_object_size {
                return Err(CoreError::CapacityExceeded {
                    name: descriptor.name.clone(),
                    size,
                    limit: config.max_object_size,
                });
            }
        }

        let stats = PartitionStats::collect(
            config.encoding,
            segments.len(),
            content.len(),
            normalized.len(),
            config.max_object_size,
            &descriptors,
        );
        info!(
            base = builder.base_name(),
            encoding = %config.encoding,
            segments = stats.segments,
            partitions = stats.partitions,
            payload_bytes = stats.payload_bytes,
            "built partition set"
        );

        Ok(BuildOutput {
            descriptors,
            digest,
            stats,
        })
    }
}

/// Returns the hex encoded SHA-256 of `content`.
#[must_use]
pub fn content_digest(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}
