//! Verify command implementation.

use super::load_set;
use catsplit_core::{decode_payload, ordered, StorageObjectDescriptor};
use std::path::Path;

/// Verification result.
#[derive(Debug)]
pub struct VerifyResult {
    /// Number of partitions checked.
    pub partitions_checked: usize,
    /// Number of partitions that decoded and fit.
    pub valid_partitions: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn new() -> Self {
        Self {
            partitions_checked: 0,
            valid_partitions: 0,
            errors: Vec::new(),
        }
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(dir: &Path, name: &str, max_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying partition set {} at {:?}", name, dir);
    println!();

    let descriptors = load_set(dir, name)?;
    let result = verify(&descriptors, max_size);

    println!("  Partitions checked: {}", result.partitions_checked);
    println!("  Valid partitions:   {}", result.valid_partitions);
    for error in &result.errors {
        println!("  Error: {}", error);
    }

    println!();
    if result.is_ok() {
        println!("✓ Partition set verification passed");
        Ok(())
    } else {
        println!("✗ Partition set verification failed");
        Err("Verification failed".into())
    }
}

fn verify(descriptors: &[StorageObjectDescriptor], max_size: usize) -> VerifyResult {
    let mut result = VerifyResult::new();

    if let Err(e) = ordered(descriptors) {
        result.errors.push(e.to_string());
    }

    for descriptor in descriptors {
        result.partitions_checked += 1;
        let size = descriptor.total_size();
        if size > max_size {
            result.errors.push(format!(
                "{} is {} bytes, over the {} byte limit",
                descriptor.name, size, max_size
            ));
            continue;
        }
        match decode_payload(descriptor) {
            Ok(_) => result.valid_partitions += 1,
            Err(e) => result
                .errors
                .push(format!("{} does not decode: {}", descriptor.name, e)),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsplit_core::{DescriptorBuilder, PartitionConfig, Partitioner};

    fn descriptors() -> Vec<StorageObjectDescriptor> {
        let content = (0..1000)
            .map(|i| format!("name: entry-{i}\nvalue: {}", i * 17))
            .collect::<Vec<_>>()
            .join("\n---\n");
        Partitioner::new(PartitionConfig::new().max_object_size(1024))
            .unwrap()
            .build(&content, &DescriptorBuilder::new("cat"))
            .unwrap()
            .descriptors
    }

    #[test]
    fn valid_set_passes() {
        let descriptors = descriptors();
        let result = verify(&descriptors, 1024);
        assert!(result.is_ok());
        assert_eq!(result.valid_partitions, descriptors.len());
    }

    #[test]
    fn oversized_partition_fails() {
        let result = verify(&descriptors(), 256);
        assert!(!result.is_ok());
        assert_eq!(result.valid_partitions, 0);
    }

    #[test]
    fn gap_and_corruption_are_reported() {
        let mut descriptors = descriptors();
        assert!(descriptors.len() > 2);
        descriptors.remove(1);
        descriptors[0].payload = bytes::Bytes::from_static(b"garbage");

        let result = verify(&descriptors, 1024);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.valid_partitions, descriptors.len() - 1);
    }
}
