//! Inspect command implementation.

use super::load_set;
use catsplit_core::{StorageObjectDescriptor, PARTITION_COUNT_LABEL};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Partition set inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store directory.
    pub path: String,
    /// Base name of the set.
    pub name: String,
    /// Number of partitions found.
    pub partition_count: usize,
    /// Partition count recorded on the descriptors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_count: Option<usize>,
    /// Content digest shared by the set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Sum of all descriptor sizes.
    pub total_size: usize,
    /// Per-partition details.
    pub partitions: Vec<PartitionInfo>,
}

/// Details for a single partition.
#[derive(Debug, Serialize)]
pub struct PartitionInfo {
    /// Object name.
    pub name: String,
    /// Ordinal.
    pub ordinal: u32,
    /// Payload encoding.
    pub encoding: String,
    /// Payload size in bytes.
    pub payload_size: usize,
    /// Size including metadata.
    pub total_size: usize,
    /// Owner, as `kind/name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Annotations.
    pub annotations: BTreeMap<String, String>,
}

impl From<&StorageObjectDescriptor> for PartitionInfo {
    fn from(descriptor: &StorageObjectDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            ordinal: descriptor.ordinal,
            encoding: descriptor.encoding().to_string(),
            payload_size: descriptor.payload.len(),
            total_size: descriptor.total_size(),
            owner: descriptor
                .owner_ref
                .as_ref()
                .map(|o| format!("{}/{}", o.kind, o.name)),
            annotations: descriptor.annotations.clone(),
        }
    }
}

/// Runs the inspect command.
pub fn run(dir: &Path, name: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(dir, name)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn inspect(dir: &Path, name: &str) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let descriptors = load_set(dir, name)?;
    let first = descriptors.first();

    Ok(InspectResult {
        path: dir.display().to_string(),
        name: name.to_string(),
        partition_count: descriptors.len(),
        recorded_count: first
            .and_then(|d| d.labels.get(PARTITION_COUNT_LABEL))
            .and_then(|count| count.parse().ok()),
        digest: first.and_then(|d| d.content_digest()).map(str::to_string),
        total_size: descriptors.iter().map(StorageObjectDescriptor::total_size).sum(),
        partitions: descriptors.iter().map(PartitionInfo::from).collect(),
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Partition set {} in {}", result.name, result.path);
    println!("{}", "=".repeat(50));
    println!();
    println!("Partitions:   {}", result.partition_count);
    if let Some(recorded) = result.recorded_count {
        if recorded != result.partition_count {
            println!("  (descriptors record {recorded}, set is incomplete or mixed)");
        }
    }
    if let Some(digest) = &result.digest {
        println!("Digest:       {digest}");
    }
    println!("Total size:   {}", format_size(result.total_size));
    println!();

    for partition in &result.partitions {
        println!(
            "  #{:<4} {:<40} {:<6} {:>10} payload {:>10} total",
            partition.ordinal,
            partition.name,
            partition.encoding,
            format_size(partition.payload_size),
            format_size(partition.total_size)
        );
        if let Some(owner) = &partition.owner {
            println!("        owner: {owner}");
        }
    }
}

fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::split::{self, SplitOptions};
    use catsplit_core::OwnerRef;
    use tempfile::tempdir;

    #[test]
    fn inspect_reports_each_partition() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("catalog.yaml");
        let content = (0..200)
            .map(|i| format!("name: entry-{i}\nvalue: {}", i * 31))
            .collect::<Vec<_>>()
            .join("\n---\n");
        std::fs::write(&input, content).unwrap();
        let store = dir.path().join("store");
        let options = SplitOptions {
            name: "cat".to_string(),
            namespace: "default".to_string(),
            owner: Some(OwnerRef::new("v1", "CatalogSource", "cat")),
            plain: true,
            max_size: 1024,
            level: 6,
            dry_run: false,
        };
        split::run(&input, &store, &options).unwrap();

        let result = inspect(&store, "cat").unwrap();
        assert!(result.partition_count > 1);
        assert_eq!(result.recorded_count, Some(result.partition_count));
        assert_eq!(result.partitions[0].encoding, "plain");
        assert_eq!(result.partitions[0].owner.as_deref(), Some("CatalogSource/cat"));
        assert!(result.partitions.iter().all(|p| p.total_size <= 1024));
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
