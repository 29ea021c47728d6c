//! Split command implementation.

use catsplit_core::{
    DescriptorBuilder, EncodingKind, OwnerRef, PartitionConfig, Partitioner, PublishReport,
    Publisher, RetryConfig,
};
use catsplit_storage::DirectoryStore;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Options for the split command.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Base name of the partition set.
    pub name: String,
    /// Namespace recorded on every partition.
    pub namespace: String,
    /// Owner attached to every partition.
    pub owner: Option<OwnerRef>,
    /// Store payloads uncompressed.
    pub plain: bool,
    /// Maximum storage object size in bytes.
    pub max_size: usize,
    /// Compression level.
    pub level: u32,
    /// Build without writing.
    pub dry_run: bool,
}

/// Runs the split command.
pub fn run(
    input: &Path,
    out: &Path,
    options: &SplitOptions,
) -> Result<Option<PublishReport>, Box<dyn std::error::Error>> {
    let content = read_input(input)?;

    let encoding = if options.plain {
        EncodingKind::Plain
    } else {
        EncodingKind::Gzip
    };
    let config = PartitionConfig::new()
        .max_object_size(options.max_size)
        .encoding(encoding)
        .level(options.level);
    let partitioner = Partitioner::new(config)?;

    let mut builder =
        DescriptorBuilder::new(options.name.as_str()).with_namespace(options.namespace.as_str());
    if let Some(owner) = &options.owner {
        builder = builder.with_owner(owner.clone());
    }

    let output = partitioner.build(&content, &builder)?;
    let stats = &output.stats;
    println!(
        "Built {} partition(s) from {} document(s)",
        stats.partitions, stats.segments
    );
    println!(
        "  Payload:  {} bytes ({:.1}% of {} normalized bytes)",
        stats.payload_bytes,
        stats.compression_ratio() * 100.0,
        stats.normalized_bytes
    );
    println!(
        "  Largest:  {} bytes ({:.1}% of limit)",
        stats.largest_descriptor,
        stats.peak_utilization() * 100.0
    );
    println!("  Digest:   {}", output.digest);

    if options.dry_run {
        info!("dry run, nothing written");
        return Ok(None);
    }

    let mut store = DirectoryStore::open(out)?;
    let report = Publisher::new(RetryConfig::default()).publish(&mut store, &output.descriptors)?;
    println!(
        "Wrote {} to {:?}: {} created, {} updated, {} unchanged, {} pruned",
        options.name,
        out,
        report.created.len(),
        report.updated.len(),
        report.unchanged.len(),
        report.pruned.len()
    );
    Ok(Some(report))
}

fn read_input(input: &Path) -> Result<String, Box<dyn std::error::Error>> {
    if input == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    Ok(std::fs::read_to_string(input)?)
}
